pub mod config;
pub mod error;

pub use config::{
    get_config, set_config_path, set_default_page_size, set_max_batch_rows, Config,
    DEFAULT_MAX_BATCH_ROWS, DEFAULT_PAGE_SIZE,
};

#[cfg(test)]
pub mod test_utils;
