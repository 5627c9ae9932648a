use swarm_core::CoreError;
use swarm_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SimResult<T> = Result<T, SimError>;
