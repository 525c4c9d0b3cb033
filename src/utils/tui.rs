use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while waiting on the backend.
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", ""])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
