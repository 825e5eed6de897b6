//! Broker launch contract and a process-based launcher.
//!
//! The harness never runs a broker itself. A [`NodeLauncher`] receives the
//! rendered configuration and returns a running [`NodeProcess`]; tests
//! either plug in their own launcher (an in-process fake, a container) or
//! use [`CommandLauncher`] to start a broker binary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use skiff_config::{RenderedConfig, SecurityProtocol};

use crate::HarnessError;

/// Starts a broker for a rendered configuration.
pub trait NodeLauncher {
    /// Launch a broker configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Launch` if the broker cannot be started.
    fn launch(&self, config: &RenderedConfig) -> Result<Box<dyn NodeProcess>, HarnessError>;
}

/// A running broker.
pub trait NodeProcess: Send {
    /// Port the listener for `protocol` is bound to, if known.
    fn bound_port(&self, protocol: SecurityProtocol) -> Option<u16>;

    /// Stop the broker and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Shutdown` if the broker does not stop.
    fn shutdown(&mut self) -> Result<(), HarnessError>;
}

/// Launches a broker binary with the configuration written to a
/// `.properties` file, passed as the final argument.
///
/// # Example
///
/// ```rust,ignore
/// let launcher = CommandLauncher::new("/opt/broker/bin/server-start.sh");
/// let broker = builder.build(&launcher)?;
/// ```
#[derive(Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<String>,
    inherit_output: bool,
}

impl fmt::Debug for CommandLauncher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLauncher")
            .field("program", &self.program)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl CommandLauncher {
    /// Launcher for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            inherit_output: false,
        }
    }

    /// Append an argument placed before the properties file.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Forward the broker's stdout/stderr to the test process.
    #[must_use]
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    fn properties_path(config: &RenderedConfig) -> Result<PathBuf, HarnessError> {
        let log_dir = config
            .log_dir()
            .ok_or_else(|| HarnessError::launch("configuration has no log directory"))?;
        Ok(log_dir.with_extension("properties"))
    }
}

impl NodeLauncher for CommandLauncher {
    fn launch(&self, config: &RenderedConfig) -> Result<Box<dyn NodeProcess>, HarnessError> {
        let properties = Self::properties_path(config)?;
        config.write_properties(&properties).map_err(|e| {
            HarnessError::launch_with_source(
                format!("cannot write {}", properties.display()),
                e,
            )
        })?;

        let (stdout, stderr) = if self.inherit_output {
            (Stdio::inherit(), Stdio::inherit())
        } else {
            (Stdio::null(), Stdio::null())
        };

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&properties)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| {
                let _ = fs::remove_file(&properties);
                HarnessError::launch_with_source(
                    format!("cannot spawn {}", self.program.display()),
                    e,
                )
            })?;

        tracing::debug!(
            program = %self.program.display(),
            pid = child.id(),
            properties = %properties.display(),
            "spawned broker process"
        );

        Ok(Box::new(ChildProcess {
            child,
            properties,
            config: config.clone(),
        }))
    }
}

struct ChildProcess {
    child: Child,
    properties: PathBuf,
    config: RenderedConfig,
}

impl NodeProcess for ChildProcess {
    // Only fixed ports are known; OS-assigned ones are not reported back.
    fn bound_port(&self, protocol: SecurityProtocol) -> Option<u16> {
        let listener = self.config.listener(protocol)?;
        u16::try_from(listener.port).ok().filter(|port| *port > 0)
    }

    fn shutdown(&mut self) -> Result<(), HarnessError> {
        if self.child.try_wait()?.is_none() {
            self.child
                .kill()
                .map_err(|e| HarnessError::shutdown(e.to_string()))?;
        }
        self.child
            .wait()
            .map_err(|e| HarnessError::shutdown(e.to_string()))?;
        remove_if_exists(&self.properties)?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
