pub(crate) const DASH: &str = "-";
pub(crate) const DOUBLE_DASH: &str = "--";
pub(crate) const SLASH: &str = "/";

pub(crate) const DEFAULT_FILE_MARKER: char = '@';
pub(crate) const DEFAULT_KEY_VALUE_SEPARATOR: &str = "=";
pub(crate) const DEFAULT_MULTI_VALUE_SEPARATOR: char = ',';
pub(crate) const DEFAULT_CASE_INVARIANT: bool = true;

pub(crate) const DEFAULT_CONSOLE_WIDTH: usize = 80;
pub(crate) const DEFAULT_DESCRIPTION_PADDING: usize = 30;

// The implicit file-reference descriptor is registered under the empty name.
pub(crate) const FILE_ARGUMENT_NAME: &str = "";
