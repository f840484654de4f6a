// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS-specific process helpers: group spawning and signal delivery.
//!
//! Spawned commands become leaders of their own process group so that
//! timeout escalation can take out children and grandchildren in one
//! signal. On non-Unix platforms the signal helpers are no-ops.

#![allow(unsafe_code)]

use std::io;
use tokio::process::{Child, Command};

/// Spawn `cmd` as the leader of a fresh process group.
#[cfg(unix)]
pub fn spawn_in_group(cmd: &mut Command) -> io::Result<Child> {
    unsafe {
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
    cmd.spawn()
}

#[cfg(not(unix))]
pub fn spawn_in_group(cmd: &mut Command) -> io::Result<Child> {
    cmd.spawn()
}

/// Send SIGTERM to a single process (best-effort).
#[cfg(unix)]
pub fn terminate_pid(pid: u32) -> io::Result<()> {
    signal_checked(unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) })
}

#[cfg(not(unix))]
pub fn terminate_pid(_pid: u32) -> io::Result<()> {
    Ok(())
}

/// Send SIGTERM to the process group led by `pid` (best-effort).
#[cfg(unix)]
pub fn terminate_group(pid: u32) -> io::Result<()> {
    signal_checked(unsafe { libc::killpg(pid as libc::pid_t, libc::SIGTERM) })
}

#[cfg(not(unix))]
pub fn terminate_group(_pid: u32) -> io::Result<()> {
    Ok(())
}

/// Send SIGKILL to the process group led by `pid` (best-effort).
#[cfg(unix)]
pub fn kill_group(pid: u32) -> io::Result<()> {
    signal_checked(unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) })
}

#[cfg(not(unix))]
pub fn kill_group(_pid: u32) -> io::Result<()> {
    Ok(())
}

/// Map a kill(2)/killpg(2) return to io::Result, swallowing ESRCH: the
/// target already exiting is success for our purposes.
#[cfg(unix)]
fn signal_checked(rc: libc::c_int) -> io::Result<()> {
    if rc == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        return Err(err);
    }
    Ok(())
}
