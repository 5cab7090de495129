use crate::device::TunHandle;
use crate::error::Result;
use crate::platform::Device;

/// Configuration for a TUN interface.
#[derive(Clone, Default, Debug)]
pub(crate) struct DeviceConfig {
    /// Empty asks the kernel to pick a name.
    pub dev_name: String,
    /// switch of Enable/Disable packet information for network driver
    pub packet_information: bool,
}

/// Builder for a TUN interface.
#[derive(Default)]
pub struct DeviceBuilder {
    dev_name: Option<String>,
    packet_information: Option<bool>,
}

impl DeviceBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn name<S: Into<String>>(mut self, dev_name: S) -> Self {
        self.dev_name = Some(dev_name.into());
        self
    }
    /// Enable or disable packet information, the first 4 bytes of each
    /// packet exchanged with the driver are a flags/protocol header when enabled.
    /// Defaults to `false`.
    pub fn packet_information(mut self, packet_information: bool) -> Self {
        self.packet_information = Some(packet_information);
        self
    }
    pub(crate) fn build_config(&mut self) -> DeviceConfig {
        DeviceConfig {
            dev_name: self.dev_name.take().unwrap_or_default(),
            packet_information: self.packet_information.take().unwrap_or(false),
        }
    }
    /// Attach the interface and return a blocking handle to it.
    pub fn build_sync(mut self) -> Result<TunHandle> {
        let device = Device::new(self.build_config())?;
        Ok(TunHandle(device))
    }
}
