//! CPU device implementation

use crate::runtime::Device;

/// CPU device (there's only one: the host CPU)
#[derive(Clone, Debug, Default)]
pub struct CpuDevice {
    id: usize,
}

impl CpuDevice {
    /// Create a new CPU device
    pub fn new() -> Self {
        Self { id: 0 }
    }

    /// Worker threads available for data-parallel passes
    pub fn num_threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        {
            rayon::current_num_threads()
        }
        #[cfg(not(feature = "rayon"))]
        {
            1
        }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        format!("cpu ({} threads)", self.num_threads())
    }
}
