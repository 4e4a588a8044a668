//! Tests for the centralized configuration constants.

use super::*;

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn largest_grid_request_fits_in_one_message() {
    let n = MAX_GRID_DIMENSION as usize;
    assert!(GRID_HEADER_BYTES + n * n * n * GRID_CORNER_BYTES <= MAX_MESSAGE_SIZE);
}

#[test]
fn largest_mesh_fits_in_one_message() {
    assert!(MAX_VERTICES * VERTEX_BYTES <= MAX_MESSAGE_SIZE);
}

#[test]
fn device_vertices_are_padded_to_four_components() {
    assert_eq!(DEVICE_VERTEX_BYTES, VERTEX_BYTES + 4);
}

#[test]
fn local_work_size_has_no_zero_extent() {
    assert!(LOCAL_WORK_SIZE.iter().all(|&extent| extent > 0));
}

// =============================================================================
// SERVICE CONFIG TESTS
// =============================================================================

/// Ensures defaults match the deployed client.
#[test]
fn default_config_is_valid() {
    let cfg = ServiceConfig::default();
    let rebuilt = ServiceConfig::new(
        &cfg.bind_address,
        cfg.port,
        cfg.max_dimension,
        cfg.lenient_expressions,
    );
    assert_eq!(rebuilt, Ok(cfg));
}

/// Validates the builder rejects invalid values.
#[test]
fn new_validates_inputs() {
    assert_eq!(
        ServiceConfig::new("localhost:80", 0, 16, false).unwrap_err(),
        ConfigError::InvalidAddress("localhost:80".to_string())
    );
    assert_eq!(
        ServiceConfig::new("127.0.0.1", 0, MAX_GRID_DIMENSION + 1, false).unwrap_err(),
        ConfigError::InvalidDimension(MAX_GRID_DIMENSION + 1)
    );
}

#[test]
fn listen_address_joins_host_and_port() {
    let cfg = ServiceConfig::new("127.0.0.1", 9000, 16, true).unwrap();
    assert_eq!(cfg.listen_address(), "127.0.0.1:9000");
}

#[test]
fn error_display_names_the_value() {
    let err = ConfigError::InvalidDimension(1);
    assert!(err.to_string().contains('1'));
}
