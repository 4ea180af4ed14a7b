pub const HEADER: &str = "bump(*): vendor update";

/// Renders the commit message body: the fixed header, a blank line, one bullet
/// per commit line in the given order and a trailing blank line.
pub fn format_message<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let body: String = lines
        .into_iter()
        .map(|line| format!("* {line}\n"))
        .collect();
    format!("{HEADER}\n\n{body}\n")
}
