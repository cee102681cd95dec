use bitflags::bitflags;

bitflags! {
    /// Basic window style capabilities relevant to taskbar eligibility.
    /// Platform backends translate native style words into these bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u32 {
        const VISIBLE = 1 << 0;
        const POPUP = 1 << 1;
        const CHILD = 1 << 2;
    }
}

bitflags! {
    /// Extended style capabilities. `APP_WINDOW` is an explicit opt-in that
    /// overrides `TOOL_WINDOW`/`NO_ACTIVATE` suppression.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExStyleFlags: u32 {
        const APP_WINDOW = 1 << 0;
        const TOOL_WINDOW = 1 << 1;
        const NO_ACTIVATE = 1 << 2;
    }
}
