use std::{
    path::Path,
    sync::{Mutex, MutexGuard, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_HOME: &str = "TIMBREKIT_CONFIG_HOME";
const MODEL_DIR: &str = "CLAP_ONNX_DIR";

/// Points the config home (and optionally the model dir) at test paths,
/// restoring the previous values on drop.
pub struct ConfigEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ConfigEnvGuard {
    pub fn set(config_home: &Path, model_dir: Option<&Path>) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = vec![
            (CONFIG_HOME, std::env::var(CONFIG_HOME).ok()),
            (MODEL_DIR, std::env::var(MODEL_DIR).ok()),
        ];
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME, config_home);
            match model_dir {
                Some(dir) => std::env::set_var(MODEL_DIR, dir),
                None => std::env::remove_var(MODEL_DIR),
            }
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ConfigEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
