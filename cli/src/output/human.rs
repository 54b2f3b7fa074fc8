//! Human-readable terminal renderer.

use crate::domain::{ComponentCommand, InstanceSpec};
use crate::output::OutputContext;

/// Renders launch plans and launch results for a terminal.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the resolved instance and its command line.
    pub fn render_plan(&self, spec: &InstanceSpec, command: &ComponentCommand) {
        self.ctx.header(&format!("{} {}", command.component, command.version));
        self.render_instance(spec);
        self.ctx.kv("Command:", &command_line(command));
    }

    /// Render a successfully launched instance.
    pub fn render_launched(&self, spec: &InstanceSpec, pid: Option<u32>) {
        self.render_instance(spec);
        if let Some(pid) = pid {
            self.ctx.kv("PID:", &pid.to_string());
        }
    }

    fn render_instance(&self, spec: &InstanceSpec) {
        self.ctx.kv("Address:", &spec.addr());
        self.ctx.kv("Status:", &format!("{}:{}", spec.advertise_host, spec.status_port));
        self.ctx.kv("Log file:", &spec.log_file().display().to_string());
    }
}

/// The command as a single shell-like line, for display only.
#[must_use]
pub fn command_line(command: &ComponentCommand) -> String {
    let binary = if command.bin_path.as_os_str().is_empty() {
        format!("<{}-server {}>", command.component, command.version)
    } else {
        command.bin_path.display().to_string()
    };
    std::iter::once(binary)
        .chain(command.args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}
