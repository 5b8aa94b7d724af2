use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::CommandFailed { command, status, stderr } => render_command_failed(command, status, stderr),
        Error::EmptyRevision => render_empty_revision(),
        Error::InvalidPattern { pattern, reason } => render_invalid_pattern(pattern, reason),
        Error::MissingBaseUrl => render_missing_base_url(),
        Error::UnknownRole { name } => render_unknown_role(name),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Create it with at least a base URL:

    base_url = \"https://github.com/<org>/<repo>\"
", path.display()),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON Output

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check `.revlink.toml`. Known keys: `base_url`, `revision`,
`lightweight_tags`, `include`, `exclude`, `[roles]`.
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_command_failed(command: &str, status: &str, stderr: &str) -> String {
    format!("\
# Error: Revision Lookup Failed

`{command}` failed ({status}):

    {stderr}

## Fix

Run inside a git working copy with at least one commit, or pin the
revision explicitly:

    revlink --revision <rev> ...
")
}

fn render_empty_revision() -> String {
    "\
# Error: Empty Revision

The revision lookup succeeded but printed nothing, and links cannot be
pinned to an empty revision.

## Fix

    revlink --revision <rev> ...
"
    .to_string()
}

fn render_invalid_pattern(pattern: &str, reason: &str) -> String {
    format!("\
# Error: Invalid Link Pattern

`{pattern}`: {reason}

## Fix

Each role path needs exactly one `%s` where the link target goes.
Write a literal percent sign as `%%`:

    [roles]
    component = \"components/%s\"
")
}

fn render_missing_base_url() -> String {
    "\
# Error: No Base URL

Links are built as `<base_url>/tree/<revision>/<role path>`, but no base
URL is configured.

## Fix

Add it to `.revlink.toml`:

    base_url = \"https://github.com/<org>/<repo>\"

Or pass it on the command line:

    revlink --base-url https://github.com/<org>/<repo> ...
"
    .to_string()
}

fn render_unknown_role(name: &str) -> String {
    format!(
        "\
# Error: Unknown Role

Role `{name}` is not configured.

## Fix

Add it to `.revlink.toml`:

    [roles]
    {name} = \"path/to/{name}/%s\"

Or run:

    revlink roles add {name} path/to/{name}/%s
"
    )
}
