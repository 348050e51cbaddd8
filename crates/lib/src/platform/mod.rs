//! Host platform helpers: per-user directories and the shell used to run
//! assemble commands.

pub mod paths;

/// Shell binary and the arguments that precede the command string.
#[cfg(not(windows))]
pub fn shell() -> (&'static str, &'static [&'static str]) {
  ("/bin/sh", &["-c"])
}

#[cfg(windows)]
pub fn shell() -> (&'static str, &'static [&'static str]) {
  ("cmd.exe", &["/C"])
}

/// Short description of the host, e.g. `linux-x86_64`.
pub fn host_triple() -> String {
  format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}
