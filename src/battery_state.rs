use std::fmt;

/// The reported state of the battery
///
/// Every field stays unset until the first frame carrying it arrives, and then keeps
/// its last received value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryState {
    /// The voltage of each cell in mV, in cell order
    pub cell_voltage_mv: Vec<i16>,
    /// The battery voltage in V/100
    pub pack_voltage_cv: Option<u16>,
    /// The battery current in A/100. Positive while charging, negative while discharging.
    pub pack_current_ca: Option<i16>,
    /// The residual capacity of the battery in Ah/100
    pub residual_capacity_cah: Option<u16>,
    /// The nominal capacity of the battery in Ah/100
    pub nominal_capacity_cah: Option<u16>,
}

impl BatteryState {
    pub fn pack_voltage_v(&self) -> Option<f32> {
        self.pack_voltage_cv.map(|v| v as f32 / 100.0)
    }

    pub fn pack_current_a(&self) -> Option<f32> {
        self.pack_current_ca.map(|v| v as f32 / 100.0)
    }

    pub fn residual_capacity_ah(&self) -> Option<f32> {
        self.residual_capacity_cah.map(|v| v as f32 / 100.0)
    }

    pub fn nominal_capacity_ah(&self) -> Option<f32> {
        self.nominal_capacity_cah.map(|v| v as f32 / 100.0)
    }

    pub fn cell_voltages_v(&self) -> Vec<f32> {
        self.cell_voltage_mv
            .iter()
            .map(|&v| v as f32 / 1000.0)
            .collect()
    }
}

struct Scaled<T>(Option<T>, f32);

impl<T: Copy + Into<f32>> fmt::Display for Scaled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v.into() / self.1),
            None => write!(f, "?"),
        }
    }
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}A @ {}V, {}Ah/{}Ah",
            Scaled(self.pack_current_ca, 100.0),
            Scaled(self.pack_voltage_cv, 100.0),
            Scaled(self.residual_capacity_cah, 100.0),
            Scaled(self.nominal_capacity_cah, 100.0),
        )?;
        if !self.cell_voltage_mv.is_empty() {
            write!(f, ", cells:")?;
            for v in &self.cell_voltage_mv {
                write!(f, " {}V", Scaled(Some(*v), 1000.0))?;
            }
        }
        Ok(())
    }
}

#[test]
fn test_display_unset() {
    assert_eq!(BatteryState::default().to_string(), "?A @ ?V, ?Ah/?Ah");
}

#[test]
fn test_display() {
    let state = BatteryState {
        cell_voltage_mv: vec![3300, 3325],
        pack_voltage_cv: Some(2650),
        pack_current_ca: Some(-150),
        residual_capacity_cah: Some(5000),
        nominal_capacity_cah: Some(6000),
    };
    assert_eq!(
        state.to_string(),
        "-1.5A @ 26.5V, 50Ah/60Ah, cells: 3.3V 3.325V"
    );
    assert_eq!(state.pack_current_a(), Some(-1.5));
    assert_eq!(state.cell_voltages_v(), vec![3.3, 3.325]);
}
