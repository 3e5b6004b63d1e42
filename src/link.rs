//! Links an emitted object file into a native executable with the system
//! toolchain. Programs need libc for `printf` and libm for `tan`.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Drivers supply the crt objects and the dynamic loader.
const DRIVERS: [&str; 3] = ["cc", "gcc", "clang"];

/// Locate a C compiler driver on `PATH`.
pub fn find_linker() -> Result<PathBuf> {
    DRIVERS
        .iter()
        .find_map(|name| which::which(name).ok())
        .context("no C compiler driver found on PATH (tried cc, gcc, clang); use --emit obj and link manually")
}

/// Scratch object file for linking `out_exe`. It lives in the temp directory so
/// it can never be the output path itself.
pub fn object_path(out_exe: &Path) -> PathBuf {
    let stem = out_exe
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crunch".to_string());
    std::env::temp_dir().join(format!("{stem}-{}.crunch.o", std::process::id()))
}

pub fn link_exe(obj: &Path, out_exe: &Path) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        let status = Command::new("link.exe")
            .arg(obj)
            .arg(format!("/OUT:{}", out_exe.display()))
            .args(["msvcrt.lib", "legacy_stdio_definitions.lib"])
            .status()
            .context("running link.exe")?;
        if !status.success() {
            bail!("link.exe failed");
        }
        return Ok(());
    }

    #[cfg(not(target_os = "windows"))]
    {
        let linker = find_linker()?;
        debug!(linker = %linker.display(), obj = %obj.display(), "linking executable");
        let status = Command::new(&linker)
            .arg(obj)
            .arg("-o")
            .arg(out_exe)
            .args(["-lc", "-lm"])
            .status()
            .with_context(|| format!("running {}", linker.display()))?;
        if !status.success() {
            bail!("{} failed with {status}", linker.display());
        }

        use std::os::unix::fs::PermissionsExt;
        let mut perm = std::fs::metadata(out_exe)?.permissions();
        perm.set_mode(0o755);
        std::fs::set_permissions(out_exe, perm)?;
        Ok(())
    }
}
