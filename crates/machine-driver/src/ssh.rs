//! SSH keypair plumbing: generate a fresh pair via `ssh-keygen`, or
//! import an existing one into the machine directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::fs;
use tokio::process::Command;

use crate::{Error, Result};

/// Generate an RSA keypair at `key_path` (private) and `key_path.pub`,
/// with no passphrase.
pub async fn generate_keypair(key_path: &Path) -> Result<()> {
    ensure_key_dir(key_path).await?;

    let output = Command::new("ssh-keygen")
        .arg("-t")
        .arg("rsa")
        .arg("-b")
        .arg("2048")
        .arg("-N")
        .arg("")
        .arg("-f")
        .arg(key_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::Ssh(format!("failed to run ssh-keygen: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Ssh(format!("ssh-keygen failed: {stderr}")));
    }

    tracing::debug!(path = %key_path.display(), "generated ssh keypair");
    Ok(())
}

/// Copy an existing keypair (`src` and `src.pub`) to `dst`, restoring
/// owner-only permissions on the private half.
pub async fn import_keypair(src: &Path, dst: &Path) -> Result<()> {
    ensure_key_dir(dst).await?;
    copy_key(src, dst, 0o600).await?;
    copy_key(&pub_path(src), &pub_path(dst), 0o644).await?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), "imported ssh keypair");
    Ok(())
}

/// Contents of the public half of the keypair at `key_path`.
pub async fn read_public_key(key_path: &Path) -> Result<String> {
    let data = fs::read_to_string(pub_path(key_path)).await?;
    Ok(data)
}

fn pub_path(key_path: &Path) -> PathBuf {
    let mut os = key_path.as_os_str().to_owned();
    os.push(".pub");
    PathBuf::from(os)
}

async fn ensure_key_dir(key_path: &Path) -> Result<()> {
    if let Some(dir) = key_path.parent() {
        fs::create_dir_all(dir).await?;
        set_mode(dir, 0o700).await?;
    }
    Ok(())
}

async fn copy_key(src: &Path, dst: &Path, mode: u32) -> Result<()> {
    fs::copy(src, dst)
        .await
        .map_err(|e| Error::Ssh(format!("unable to copy ssh key {}: {e}", src.display())))?;
    set_mode(dst, mode).await
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn import_copies_both_halves() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("id_rsa");
        fs::write(&src, "PRIVATE KEY").await.unwrap();
        fs::write(pub_path(&src), "ssh-rsa AAAA test@host").await.unwrap();

        let dst = dir.path().join("machines/agent-01/id_rsa");
        import_keypair(&src, &dst).await.unwrap();

        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "PRIVATE KEY");
        assert_eq!(
            read_public_key(&dst).await.unwrap(),
            "ssh-rsa AAAA test@host"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let src = dir.path().join("id_rsa");
        fs::write(&src, "PRIVATE KEY").await.unwrap();
        fs::write(pub_path(&src), "ssh-rsa AAAA").await.unwrap();

        let dst = dir.path().join("machines/agent-01/id_rsa");
        import_keypair(&src, &dst).await.unwrap();

        let mode = std::fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn missing_source_is_an_ssh_error() {
        let dir = tempdir().unwrap();
        let err = import_keypair(
            &dir.path().join("nope"),
            &dir.path().join("machines/m/id_rsa"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Ssh(_)));
    }
}
