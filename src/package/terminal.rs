//! 受管终端：同一时刻最多存在一个用于安装的终端会话

use super::command::launch_commands;
use crate::config::ShellKind;
use anyhow::{anyhow, Context, Result};
use duct::{cmd, Handle};
use std::path::PathBuf;

/// 一个终端会话
pub trait Terminal {
    fn name(&self) -> &str;
    /// 写入文本；add_new_line 为 true 时执行当前行
    fn send_text(&mut self, text: &str, add_new_line: bool) -> Result<()>;
    /// 切到前台；preserve_focus 为 false 时把焦点交给终端
    fn show(&mut self, preserve_focus: bool) -> Result<()>;
    fn dispose(&mut self);
    /// 会话是否已经结束（相当于用户关闭了终端）
    fn has_exited(&mut self) -> bool;
}

/// 创建终端的宿主
pub trait TerminalHost {
    fn create_terminal(&mut self, name: &str) -> Result<Box<dyn Terminal>>;
}

/// 受管终端槽位：无终端 / 有一个终端
pub struct ManagedTerminal<H: TerminalHost> {
    host: H,
    name: String,
    shell: ShellKind,
    active: Option<Box<dyn Terminal>>,
}

impl<H: TerminalHost> ManagedTerminal<H> {
    pub fn new(host: H, name: impl Into<String>, shell: ShellKind) -> Self {
        Self {
            host,
            name: name.into(),
            shell,
            active: None,
        }
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// 销毁旧终端，新建终端，清屏后执行命令并切到前台
    pub fn run(&mut self, command: &str) -> Result<()> {
        if let Some(mut previous) = self.active.take() {
            log::debug!("销毁旧终端: {}", previous.name());
            previous.dispose();
        }

        let terminal = self.active.insert(self.host.create_terminal(&self.name)?);
        log::info!("终端 {} 执行: {}", self.name, command);

        let (launch, clear) = launch_commands(command, self.shell);
        terminal.send_text(&clear, true)?;
        terminal.send_text(&launch, true)?;
        terminal.show(false)?;
        Ok(())
    }

    /// 外部关闭事件：只处理本槽位同名的终端
    pub fn terminal_closed(&mut self, name: &str) {
        if self.active.as_ref().is_some_and(|t| t.name() == name) {
            log::debug!("终端已关闭: {}", name);
            self.active = None;
        }
    }

    /// 检查当前终端是否已结束，结束则视为被关闭
    pub fn reap(&mut self) {
        let exited = match self.active.as_mut() {
            Some(terminal) => terminal.has_exited(),
            None => false,
        };
        if exited {
            let name = self.name.clone();
            self.terminal_closed(&name);
        }
    }
}

/// 通过系统 shell 执行命令的终端宿主，会话都在 cwd 中启动
pub struct ShellHost {
    shell: ShellKind,
    cwd: PathBuf,
}

impl ShellHost {
    pub fn new(shell: ShellKind, cwd: PathBuf) -> Self {
        Self { shell, cwd }
    }
}

impl TerminalHost for ShellHost {
    fn create_terminal(&mut self, name: &str) -> Result<Box<dyn Terminal>> {
        Ok(Box::new(ShellTerminal {
            name: name.to_string(),
            shell: self.shell,
            cwd: self.cwd.clone(),
            pending: String::new(),
            running: None,
            lines_run: 0,
            disposed: false,
        }))
    }
}

/// 按行顺序执行命令的会话，继承当前进程的 stdio
pub struct ShellTerminal {
    name: String,
    shell: ShellKind,
    cwd: PathBuf,
    pending: String,
    running: Option<Handle>,
    lines_run: usize,
    disposed: bool,
}

impl ShellTerminal {
    fn execute_line(&mut self, line: &str) -> Result<()> {
        self.wait_running()?;
        let expression = match self.shell {
            ShellKind::Sh => cmd!("sh", "-c", line),
            ShellKind::Bash => cmd!("bash", "-c", line),
            ShellKind::Zsh => cmd!("zsh", "-c", line),
            ShellKind::Powershell => cmd!("powershell", "-NoProfile", "-Command", line),
            ShellKind::Cmd => cmd!("cmd", "/C", line),
        };
        let handle = expression
            .dir(&self.cwd)
            .unchecked()
            .start()
            .with_context(|| format!("无法启动 {:?}: {}", self.shell, line))?;
        self.running = Some(handle);
        self.lines_run += 1;
        Ok(())
    }

    fn wait_running(&mut self) -> Result<()> {
        if let Some(handle) = self.running.take() {
            let output = handle.wait().context("等待终端命令结束失败")?;
            if !output.status.success() {
                log::warn!("终端 {} 命令退出: {}", self.name, output.status);
            }
        }
        Ok(())
    }
}

impl Terminal for ShellTerminal {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_text(&mut self, text: &str, add_new_line: bool) -> Result<()> {
        if self.disposed {
            return Err(anyhow!("终端 {} 已被销毁", self.name));
        }
        self.pending.push_str(text);
        if add_new_line {
            let line = std::mem::take(&mut self.pending);
            if !line.trim().is_empty() {
                self.execute_line(&line)?;
            }
        }
        Ok(())
    }

    fn show(&mut self, preserve_focus: bool) -> Result<()> {
        if !preserve_focus {
            self.wait_running()?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(handle) = self.running.take() {
            if let Err(e) = handle.kill() {
                log::warn!("终止终端 {} 的命令失败: {}", self.name, e);
            }
        }
        self.disposed = true;
    }

    fn has_exited(&mut self) -> bool {
        if self.disposed {
            return true;
        }
        match &self.running {
            Some(handle) => matches!(handle.try_wait(), Ok(Some(_))),
            None => self.lines_run > 0,
        }
    }
}
