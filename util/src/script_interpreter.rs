//! # Autonomous script interpreter module
//!
//! This module reads autonomous scripts, one command per line in the form
//!
//! ```text
//! command param1 param2 param3 param4 param5
//! ```
//!
//! with fields separated by any run of spaces and/or commas. Missing trailing
//! parameters are unset. Scripts live in a single directory and are
//! identified by the [`SCRIPT_EXTENSION`] extension.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Extension of script files.
pub const SCRIPT_EXTENSION: &str = "as";

/// Maximum number of numeric parameters a command can carry.
pub const MAX_PARAMS: usize = 5;

/// Parameter value which scripts may use to explicitly mark a parameter as
/// unset.
pub const UNSET_PARAM: f64 = -9999.0;

/// Command name returned once the script has been exhausted.
pub const END_COMMAND: &str = "end";

/// Command name returned when no valid script is loaded.
pub const INVALID_COMMAND: &str = "invalid";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single scripted command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptCommand {
    /// Lower case command name
    pub name: String,

    /// Numeric parameters, `None` if unset
    pub params: [Option<f64>; MAX_PARAMS],
}

/// A loaded script with a cursor pointing at the current command.
#[derive(Debug, Clone)]
pub struct Script {
    path: PathBuf,
    cmds: Vec<ScriptCommand>,
    cursor: usize,
    end: ScriptCommand,
}

/// The set of scripts available to the robot and which one is selected.
#[derive(Debug, Default)]
pub struct ScriptSelector {
    scripts: Vec<PathBuf>,
    selected: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("Could not list the script directory {0:?}: {1}")]
    DirReadError(PathBuf, std::io::Error),

    #[error("No scripts are available")]
    NoScripts,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptCommand {
    /// Build a command with no parameters.
    pub fn bare(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            params: [None; MAX_PARAMS],
        }
    }

    /// The command returned once a script is exhausted.
    pub fn end() -> Self {
        Self::bare(END_COMMAND)
    }

    /// The command returned when no script is available.
    pub fn invalid() -> Self {
        Self::bare(INVALID_COMMAND)
    }

    /// Parse a command from one script line, returning `None` if the line
    /// contains no tokens.
    pub fn parse_line(line: &str, separator: &Regex) -> Option<Self> {
        let mut tokens = separator
            .split(line.trim())
            .filter(|t| !t.is_empty());

        let name = tokens.next()?.to_lowercase();
        let mut params = [None; MAX_PARAMS];

        for (i, token) in tokens.enumerate() {
            if i >= MAX_PARAMS {
                warn!("Script command \"{}\" has extra parameters which are ignored", name);
                break;
            }

            params[i] = match token.parse::<f64>() {
                Ok(v) if v == UNSET_PARAM => None,
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(
                        "Script command \"{}\" parameter {} (\"{}\") is not a number",
                        name, i + 1, token
                    );
                    None
                }
            };
        }

        Some(Self { name, params })
    }

    /// Get parameter `n`, counting from 1 as scripts do.
    pub fn param(&self, n: usize) -> Option<f64> {
        if n == 0 || n > MAX_PARAMS {
            return None
        }
        self.params[n - 1]
    }

    /// Get the first `N` parameters, or `None` if any of them is unset.
    pub fn required<const N: usize>(&self) -> Option<[f64; N]> {
        if N > MAX_PARAMS {
            return None
        }

        let mut out = [0f64; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.params[i]?;
        }
        Some(out)
    }

    /// Returns true if this command halts the script.
    pub fn is_terminal(&self) -> bool {
        self.name == END_COMMAND || self.name == INVALID_COMMAND
    }
}

impl Script {
    /// Load a script from the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let text = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut script = Self::parse(&text);
        script.path = path;

        Ok(script)
    }

    /// Parse a script from its text.
    pub fn parse(text: &str) -> Self {
        let separator = separator_regex();

        let cmds: Vec<ScriptCommand> = text
            .lines()
            .filter_map(|l| ScriptCommand::parse_line(l, &separator))
            .collect();

        debug!("Parsed script with {} commands", cmds.len());

        Self {
            path: PathBuf::new(),
            cmds,
            cursor: 0,
            end: ScriptCommand::end(),
        }
    }

    /// The command under the cursor, or `end` if the script is exhausted.
    pub fn current(&self) -> &ScriptCommand {
        self.cmds.get(self.cursor).unwrap_or(&self.end)
    }

    /// Move the cursor onto the next command.
    pub fn advance(&mut self) -> &ScriptCommand {
        if self.cursor < self.cmds.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Move the cursor back to the first command.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Index of the current command.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the number of commands in the script
    pub fn num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Path the script was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScriptSelector {
    /// List the scripts in the given directory in name order.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self, ScriptError> {
        let dir = dir.as_ref();

        let entries = fs::read_dir(dir)
            .map_err(|e| ScriptError::DirReadError(dir.to_path_buf(), e))?;

        let mut scripts: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SCRIPT_EXTENSION))
            .collect();

        scripts.sort();

        Ok(Self {
            scripts,
            selected: 0,
        })
    }

    /// Select the next script, wrapping around at the end of the list.
    pub fn cycle(&mut self) -> Option<&Path> {
        if self.scripts.is_empty() {
            return None
        }

        self.selected = (self.selected + 1) % self.scripts.len();
        self.selected()
    }

    /// Path of the selected script, if any exist.
    pub fn selected(&self) -> Option<&Path> {
        self.scripts.get(self.selected).map(|p| p.as_path())
    }

    /// Number of scripts found.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Returns true if no scripts were found.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Load the selected script.
    pub fn load_selected(&self) -> Result<Script, ScriptError> {
        match self.selected() {
            Some(p) => Script::load(p),
            None => Err(ScriptError::NoScripts)
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn separator_regex() -> Regex {
    // The pattern is a literal so building it cannot fail
    match Regex::new(r"[ ,\t]+") {
        Ok(r) => r,
        Err(e) => unreachable!("Invalid separator regex: {}", e)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_line() {
        let sep = separator_regex();

        let cmd = ScriptCommand::parse_line("DriveTime 2.5, 2 ,0.8", &sep).unwrap();
        assert_eq!(cmd.name, "drivetime");
        assert_eq!(cmd.param(1), Some(2.5));
        assert_eq!(cmd.param(2), Some(2.0));
        assert_eq!(cmd.param(3), Some(0.8));
        assert_eq!(cmd.param(4), None);
        assert_eq!(cmd.required::<3>(), Some([2.5, 2.0, 0.8]));
        assert_eq!(cmd.required::<4>(), None);

        // Explicit sentinel and garbage are both unset
        let cmd = ScriptCommand::parse_line("wait -9999", &sep).unwrap();
        assert_eq!(cmd.param(1), None);
        let cmd = ScriptCommand::parse_line("wait abc", &sep).unwrap();
        assert_eq!(cmd.param(1), None);

        assert!(ScriptCommand::parse_line("  , ,  ", &sep).is_none());
        assert!(ScriptCommand::parse_line("", &sep).is_none());
    }

    #[test]
    fn test_script_cursor() {
        let mut script = Script::parse("wait 2\n\ndrivedistance 5 0.5\nend\n");

        assert_eq!(script.num_cmds(), 3);
        assert_eq!(script.current().name, "wait");
        assert_eq!(script.advance().name, "drivedistance");
        assert_eq!(script.advance().name, "end");

        // Running off the end keeps returning end
        assert_eq!(script.advance().name, END_COMMAND);
        assert_eq!(script.advance().name, END_COMMAND);
        assert!(script.current().is_terminal());

        script.rewind();
        assert_eq!(script.cursor(), 0);
        assert_eq!(script.current().name, "wait");
    }

    #[test]
    fn test_selector() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["b.as", "a.as", "notes.txt", "c.as"] {
            fs::write(dir.path().join(name), "wait 1\n").unwrap();
        }

        let mut sel = ScriptSelector::discover(dir.path()).unwrap();
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.selected().unwrap().file_name().unwrap(), "a.as");
        assert_eq!(sel.cycle().unwrap().file_name().unwrap(), "b.as");
        assert_eq!(sel.cycle().unwrap().file_name().unwrap(), "c.as");
        assert_eq!(sel.cycle().unwrap().file_name().unwrap(), "a.as");

        let script = sel.load_selected().unwrap();
        assert_eq!(script.current().name, "wait");
        assert_eq!(script.path().file_name().unwrap(), "a.as");
    }

    #[test]
    fn test_empty_selector() {
        let dir = tempfile::tempdir().unwrap();
        let mut sel = ScriptSelector::discover(dir.path()).unwrap();

        assert!(sel.is_empty());
        assert!(sel.cycle().is_none());
        assert!(matches!(sel.load_selected(), Err(ScriptError::NoScripts)));
    }
}
