use crate::errors::{CollectorError, Result};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Strategy for picking one node endpoint per query attempt.
///
/// Selection is per attempt, so a retry of the same logical query may land
/// on a different endpoint.
pub trait EndpointSelector: Send + Sync {
    fn select(&self) -> &str;
}

/// Uniform-random selection over a static pool, the default strategy.
///
/// Spreads load and provides implicit failover across independently
/// operated nodes.
pub struct UniformRandomSelector {
    endpoints: Vec<String>,
}

impl UniformRandomSelector {
    /// Creates a selector over a non-empty pool
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(CollectorError::configuration(
                "endpoints",
                "Endpoint pool must not be empty",
            ));
        }
        Ok(Self { endpoints })
    }
}

impl EndpointSelector for UniformRandomSelector {
    fn select(&self) -> &str {
        // Pool is non-empty by construction.
        let index = rand::thread_rng().gen_range(0..self.endpoints.len());
        &self.endpoints[index]
    }
}

/// Deterministic round-robin selection, substituted for the random
/// strategy in tests
pub struct RotatingSelector {
    endpoints: Vec<String>,
    next: AtomicUsize,
}

impl RotatingSelector {
    /// Creates a selector over a non-empty pool
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(CollectorError::configuration(
                "endpoints",
                "Endpoint pool must not be empty",
            ));
        }
        Ok(Self {
            endpoints,
            next: AtomicUsize::new(0),
        })
    }
}

impl EndpointSelector for RotatingSelector {
    fn select(&self) -> &str {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<String> {
        vec![
            "https://rpc-1.example".to_string(),
            "https://rpc-2.example".to_string(),
            "https://rpc-3.example".to_string(),
        ]
    }

    #[test]
    fn test_uniform_random_rejects_empty_pool() {
        assert!(UniformRandomSelector::new(Vec::new()).is_err());
    }

    #[test]
    fn test_uniform_random_selects_pool_member() {
        let endpoints = pool();
        let selector = UniformRandomSelector::new(endpoints.clone()).unwrap();

        for _ in 0..100 {
            let selected = selector.select();
            assert!(endpoints.iter().any(|url| url == selected));
        }
    }

    #[test]
    fn test_uniform_random_single_endpoint() {
        let selector =
            UniformRandomSelector::new(vec!["https://rpc-1.example".to_string()]).unwrap();
        assert_eq!(selector.select(), "https://rpc-1.example");
    }

    #[test]
    fn test_rotating_cycles_in_order() {
        let selector = RotatingSelector::new(pool()).unwrap();

        assert_eq!(selector.select(), "https://rpc-1.example");
        assert_eq!(selector.select(), "https://rpc-2.example");
        assert_eq!(selector.select(), "https://rpc-3.example");
        assert_eq!(selector.select(), "https://rpc-1.example");
    }

    #[test]
    fn test_rotating_rejects_empty_pool() {
        assert!(RotatingSelector::new(Vec::new()).is_err());
    }
}
