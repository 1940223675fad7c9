use crate::config::{Config, CONFIG};

/// Runs `f` with the global configuration replaced by `config`, restoring the
/// previous value afterwards.
pub fn with_config<F>(config: Option<Config>, f: F)
where
    F: FnOnce(),
{
    let previous = {
        let mut guard = CONFIG.write().unwrap();
        std::mem::replace(&mut *guard, config)
    };

    f();

    *CONFIG.write().unwrap() = previous;
}

pub fn with_env<F>(vars: Vec<(&str, &str)>, f: F)
where
    F: FnOnce(),
{
    let old_vars: Vec<_> = vars
        .iter()
        .map(|(k, _)| (*k, std::env::var(k).ok()))
        .collect();

    for (key, value) in &vars {
        std::env::set_var(key, value);
    }

    f();

    for (key, old_value) in old_vars {
        match old_value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}
