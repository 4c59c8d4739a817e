use log::LevelFilter;

use crate::config::RocketConfig;


pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .filter(Some("gimbal"), LevelFilter::Debug)
        .filter(Some("torque"), LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Default rocket: 8-engine ring plus center engine 9, full tanks.
pub fn rocket_config() -> RocketConfig {
    RocketConfig::default()
}
