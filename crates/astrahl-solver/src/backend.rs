use crate::errors::SolverError;
use crate::request::{AlgorithmConfig, PropagateRequest, SplitsRequest};
use crate::response::{first_line, last_line};

/// Transport to something that answers solver requests.
///
/// Single calls return the raw textual output. Bulk calls return one answer
/// line per request, in request order.
pub trait SolverBackend {
    /// Run an allocation request; the answer is the last non-empty line.
    fn splits(
        &self,
        request: &SplitsRequest,
        algorithm: &AlgorithmConfig,
    ) -> Result<String, SolverError>;

    /// Run a probability request; the answer is the first line.
    fn propagate(&self, request: &PropagateRequest) -> Result<String, SolverError>;

    fn splits_bulk(
        &self,
        requests: &[(SplitsRequest, AlgorithmConfig)],
    ) -> Result<Vec<String>, SolverError> {
        requests
            .iter()
            .map(|(request, algorithm)| {
                let output = self.splits(request, algorithm)?;
                Ok(last_line(&output).unwrap_or_default().to_string())
            })
            .collect()
    }

    fn propagate_bulk(&self, requests: &[PropagateRequest]) -> Result<Vec<String>, SolverError> {
        requests
            .iter()
            .map(|request| {
                let output = self.propagate(request)?;
                Ok(first_line(&output).unwrap_or_default().to_string())
            })
            .collect()
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for &B {
    fn splits(
        &self,
        request: &SplitsRequest,
        algorithm: &AlgorithmConfig,
    ) -> Result<String, SolverError> {
        (**self).splits(request, algorithm)
    }

    fn propagate(&self, request: &PropagateRequest) -> Result<String, SolverError> {
        (**self).propagate(request)
    }

    fn splits_bulk(
        &self,
        requests: &[(SplitsRequest, AlgorithmConfig)],
    ) -> Result<Vec<String>, SolverError> {
        (**self).splits_bulk(requests)
    }

    fn propagate_bulk(&self, requests: &[PropagateRequest]) -> Result<Vec<String>, SolverError> {
        (**self).propagate_bulk(requests)
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn splits(
        &self,
        request: &SplitsRequest,
        algorithm: &AlgorithmConfig,
    ) -> Result<String, SolverError> {
        (**self).splits(request, algorithm)
    }

    fn propagate(&self, request: &PropagateRequest) -> Result<String, SolverError> {
        (**self).propagate(request)
    }

    fn splits_bulk(
        &self,
        requests: &[(SplitsRequest, AlgorithmConfig)],
    ) -> Result<Vec<String>, SolverError> {
        (**self).splits_bulk(requests)
    }

    fn propagate_bulk(&self, requests: &[PropagateRequest]) -> Result<Vec<String>, SolverError> {
        (**self).propagate_bulk(requests)
    }
}
