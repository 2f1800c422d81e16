//! The host interface: the only door to the outside world.
//!
//! Every side effect the vocabulary can cause - terminal I/O, the
//! filesystem, child processes, environment and process identity -
//! goes through a [`Host`]. Two implementations ship with the crate:
//!
//! - [`OsHost`]: backs every hook with the real process and OS.
//! - [`MemHost`]: a restricted host with scripted input, captured
//!   output and an in-memory file table. Capabilities it lacks
//!   (directory changes, child processes) answer `Unsupported`.
//!   It is the host the test suites run against.

use crate::{Error, MAX_READ_BYTES};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, IsTerminal, Read, Write};
use std::rc::Rc;

/// Captured result of a child process run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status; nonzero means failure
    pub status: i32,
}

pub trait Host {
    /// Read one line from standard input, without its terminator.
    /// `Ok(None)` signals end of input.
    fn read_line(&mut self) -> Result<Option<String>, Error>;
    fn write_out(&mut self, text: &str) -> Result<(), Error>;
    fn write_err(&mut self, text: &str) -> Result<(), Error>;
    fn stdin_is_tty(&self) -> bool;
    fn stdout_is_tty(&self) -> bool;
    fn stderr_is_tty(&self) -> bool;

    fn getcwd(&self) -> Result<String, Error>;
    fn chdir(&mut self, path: &str) -> Result<(), Error>;
    fn list_dir(&self, path: &str) -> Result<Vec<String>, Error>;
    /// Read a whole file. Implementations must refuse files larger
    /// than [`MAX_READ_BYTES`] rather than truncate them.
    fn read_file(&self, path: &str) -> Result<String, Error>;
    fn write_file(&mut self, path: &str, content: &str) -> Result<(), Error>;
    /// Append, creating the file when it does not exist.
    fn append_file(&mut self, path: &str, content: &str) -> Result<(), Error>;

    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, Error>;

    fn env_get(&self, name: &str) -> Option<String>;
    /// Process arguments, the process name at index 0.
    fn argv(&self) -> Vec<String>;
    /// Terminate. [`OsHost`] never returns from this; restricted
    /// hosts record the code and return it as an [`Error::Exit`]
    /// control tag for the driver.
    fn exit(&mut self, code: u8) -> Error;
}

// --- the real process ------------------------------------------------------

/// Host backed by the actual process: std streams, std::fs, std::env.
#[derive(Default)]
pub struct OsHost;

impl Host for OsHost {
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::io(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn write_out(&mut self, text: &str) -> Result<(), Error> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| Error::io(e.to_string()))
    }

    fn write_err(&mut self, text: &str) -> Result<(), Error> {
        let mut err = std::io::stderr().lock();
        err.write_all(text.as_bytes())
            .and_then(|()| err.flush())
            .map_err(|e| Error::io(e.to_string()))
    }

    fn stdin_is_tty(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn stdout_is_tty(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn stderr_is_tty(&self) -> bool {
        std::io::stderr().is_terminal()
    }

    fn getcwd(&self) -> Result<String, Error> {
        std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|e| Error::io(e.to_string()))
    }

    fn chdir(&mut self, path: &str) -> Result<(), Error> {
        std::env::set_current_dir(path).map_err(|e| Error::io(format!("cd {path}: {e}")))
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, Error> {
        let entries = std::fs::read_dir(path).map_err(|e| Error::io(format!("ls {path}: {e}")))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(e.to_string()))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<String, Error> {
        let meta =
            std::fs::metadata(path).map_err(|e| Error::io(format!("readf {path}: {e}")))?;
        if meta.len() > MAX_READ_BYTES {
            return Err(Error::io(format!(
                "readf {path}: file exceeds {MAX_READ_BYTES} bytes"
            )));
        }
        let mut file =
            std::fs::File::open(path).map_err(|e| Error::io(format!("readf {path}: {e}")))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::io(format!("readf {path}: {e}")))?;
        Ok(content)
    }

    fn write_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        std::fs::write(path, content).map_err(|e| Error::io(format!("writef {path}: {e}")))
    }

    fn append_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(format!("appendf {path}: {e}")))?;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::io(format!("appendf {path}: {e}")))
    }

    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, Error> {
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| Error::io("exec: empty command line"))?;
        let output = std::process::Command::new(program)
            .args(rest)
            .output()
            .map_err(|e| Error::io(format!("exec {program}: {e}")))?;
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }

    fn env_get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn argv(&self) -> Vec<String> {
        std::env::args().collect()
    }

    fn exit(&mut self, code: u8) -> Error {
        std::process::exit(code.into())
    }
}

// --- the restricted host ---------------------------------------------------

/// A capability-restricted host: scripted stdin, captured output, an
/// in-memory file table, and no directory or process access.
#[derive(Default)]
pub struct MemHost {
    input: VecDeque<String>,
    out: String,
    err: String,
    files: HashMap<String, String>,
    env: HashMap<String, String>,
    argv: Vec<String>,
    exit_code: Option<u8>,
}

impl MemHost {
    pub fn new() -> MemHost {
        MemHost {
            argv: vec!["catena".to_owned()],
            ..MemHost::default()
        }
    }

    pub fn with_input(mut self, lines: &[&str]) -> MemHost {
        self.input = lines.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    pub fn with_file(mut self, path: &str, content: &str) -> MemHost {
        self.files.insert(path.to_owned(), content.to_owned());
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> MemHost {
        self.env.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn with_argv(mut self, argv: &[&str]) -> MemHost {
        self.argv = argv.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    pub fn out(&self) -> &str {
        &self.out
    }

    pub fn err(&self) -> &str {
        &self.err
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn exit_code(&self) -> Option<u8> {
        self.exit_code
    }
}

impl Host for MemHost {
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        Ok(self.input.pop_front())
    }

    fn write_out(&mut self, text: &str) -> Result<(), Error> {
        self.out.push_str(text);
        Ok(())
    }

    fn write_err(&mut self, text: &str) -> Result<(), Error> {
        self.err.push_str(text);
        Ok(())
    }

    fn stdin_is_tty(&self) -> bool {
        false
    }

    fn stdout_is_tty(&self) -> bool {
        false
    }

    fn stderr_is_tty(&self) -> bool {
        false
    }

    fn getcwd(&self) -> Result<String, Error> {
        Ok("/".to_owned())
    }

    fn chdir(&mut self, _path: &str) -> Result<(), Error> {
        Err(Error::Unsupported("changing directory"))
    }

    fn list_dir(&self, _path: &str) -> Result<Vec<String>, Error> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_file(&self, path: &str) -> Result<String, Error> {
        let content = self
            .files
            .get(path)
            .ok_or_else(|| Error::io(format!("readf {path}: no such file")))?;
        if content.len() as u64 > MAX_READ_BYTES {
            return Err(Error::io(format!(
                "readf {path}: file exceeds {MAX_READ_BYTES} bytes"
            )));
        }
        Ok(content.clone())
    }

    fn write_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        self.files.insert(path.to_owned(), content.to_owned());
        Ok(())
    }

    fn append_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        self.files.entry(path.to_owned()).or_default().push_str(content);
        Ok(())
    }

    fn run_process(&mut self, _argv: &[String]) -> Result<ProcessOutput, Error> {
        Err(Error::Unsupported("running processes"))
    }

    fn env_get(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn argv(&self) -> Vec<String> {
        self.argv.clone()
    }

    fn exit(&mut self, code: u8) -> Error {
        self.exit_code = Some(code);
        Error::Exit(code)
    }
}

/// A [`MemHost`] behind a shared handle, so an embedder (or a test)
/// can inspect captured output and files while a machine owns the
/// host.
#[derive(Clone, Default)]
pub struct SharedMemHost(Rc<RefCell<MemHost>>);

impl SharedMemHost {
    pub fn new(inner: MemHost) -> SharedMemHost {
        SharedMemHost(Rc::new(RefCell::new(inner)))
    }

    pub fn out(&self) -> String {
        self.0.borrow().out().to_owned()
    }

    pub fn err(&self) -> String {
        self.0.borrow().err().to_owned()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.0.borrow().file(path).map(str::to_owned)
    }

    pub fn exit_code(&self) -> Option<u8> {
        self.0.borrow().exit_code()
    }
}

impl Host for SharedMemHost {
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        self.0.borrow_mut().read_line()
    }

    fn write_out(&mut self, text: &str) -> Result<(), Error> {
        self.0.borrow_mut().write_out(text)
    }

    fn write_err(&mut self, text: &str) -> Result<(), Error> {
        self.0.borrow_mut().write_err(text)
    }

    fn stdin_is_tty(&self) -> bool {
        self.0.borrow().stdin_is_tty()
    }

    fn stdout_is_tty(&self) -> bool {
        self.0.borrow().stdout_is_tty()
    }

    fn stderr_is_tty(&self) -> bool {
        self.0.borrow().stderr_is_tty()
    }

    fn getcwd(&self) -> Result<String, Error> {
        self.0.borrow().getcwd()
    }

    fn chdir(&mut self, path: &str) -> Result<(), Error> {
        self.0.borrow_mut().chdir(path)
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, Error> {
        self.0.borrow().list_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<String, Error> {
        self.0.borrow().read_file(path)
    }

    fn write_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        self.0.borrow_mut().write_file(path, content)
    }

    fn append_file(&mut self, path: &str, content: &str) -> Result<(), Error> {
        self.0.borrow_mut().append_file(path, content)
    }

    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, Error> {
        self.0.borrow_mut().run_process(argv)
    }

    fn env_get(&self, name: &str) -> Option<String> {
        self.0.borrow().env_get(name)
    }

    fn argv(&self) -> Vec<String> {
        self.0.borrow().argv()
    }

    fn exit(&mut self, code: u8) -> Error {
        self.0.borrow_mut().exit(code)
    }
}
