//! Interactive prompts on the terminal

use blogdesk_core::Result;
use std::io::{self, BufRead, Write};

/// Ask for a line of input
pub(crate) fn ask(label: &str) -> Result<String> {
    let stdin = io::stdin();
    ask_from(&mut stdin.lock(), &mut io::stderr(), label)
}

/// Ask for a password; the terminal does not echo it
pub(crate) fn password(label: &str) -> Result<String> {
    password_from(&mut io::stderr(), label, rpassword::read_password)
}

/// Ask a yes/no question; anything but `y`/`yes` is a no
pub(crate) fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_from(&mut stdin.lock(), &mut io::stderr(), question)
}

fn ask_from<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_from<W, F>(output: &mut W, label: &str, read: F) -> Result<String>
where
    W: Write,
    F: FnOnce() -> io::Result<String>,
{
    write!(output, "{label}: ")?;
    output.flush()?;
    Ok(read()?)
}

fn confirm_from<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    let answer = ask_from(input, output, &format!("{question} [y/N]"))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
