//! Simulated I2C bus
//!
//! Only address acknowledgement is modelled. Devices on the bus accept every
//! write and read back zeros; everything else NACKs.

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone)]
pub struct SimBus {
    devices: Vec<u8>,
}

impl SimBus {
    pub fn new(devices: &[u8]) -> Self {
        Self {
            devices: devices.to_vec(),
        }
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        if !self.devices.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            if let Operation::Read(buffer) = operation {
                buffer.fill(0);
            }
        }
        Ok(())
    }
}
