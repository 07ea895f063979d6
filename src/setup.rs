use crate::player::{binary_available, PlayerBackend};
use tracing::warn;

/// Checks that the engine binary for `backend` is on PATH. Returns a user
/// facing hint when it is missing.
pub fn check_backend_installed(backend: PlayerBackend) -> Result<(), String> {
    if binary_available(backend.program()) {
        return Ok(());
    }
    warn!(program = backend.program(), "player binary not found");
    Err(install_hint(backend))
}

pub fn install_hint(backend: PlayerBackend) -> String {
    let package = match backend {
        PlayerBackend::System | PlayerBackend::SoftwareDecoder => "mpv",
        PlayerBackend::Vlc => "vlc",
    };
    if cfg!(target_os = "windows") {
        format!("{} not found. Install it with 'winget install {}'.", package, package)
    } else if cfg!(target_os = "macos") {
        format!("{} not found. Install it with 'brew install {}'.", package, package)
    } else {
        format!(
            "{} not found. Install it with your package manager (e.g. 'sudo apt install {}').",
            package, package
        )
    }
}

/// First backend whose binary is installed, preferring `preferred`
pub fn first_available(preferred: PlayerBackend) -> Option<PlayerBackend> {
    std::iter::once(preferred)
        .chain(PlayerBackend::all().iter().copied())
        .find(|b| binary_available(b.program()))
}
