use superstruct::superstruct;

#[superstruct]
mod sensors {
    pub struct Thermometer {
        #[superstruct(rename = "value")]
        pub celsius: f32,
        #[superstruct(skip)]
        pub calibration: f32,
    }

    impl Thermometer {
        #[superstruct(setter = "unit")]
        pub fn use_unit(&mut self, unit: &'static str) {
            let _ = unit;
        }

        pub fn unit(&self) -> &'static str {
            "C"
        }
    }

    pub struct Hygrometer {
        pub value: f32,
        pub calibration: f32,
        pub unit: &'static str,
    }

    impl Hygrometer {
        #[superstruct(skip)]
        pub fn reset(&mut self) {
            self.value = 0.0;
        }
    }

    #[superstruct]
    pub enum Sensor {
        Thermometer,
        Hygrometer,
    }
}

use sensors::*;

#[test]
fn renamed_field() {
    let mut s: Sensor = Thermometer {
        celsius: 21.5,
        calibration: 0.0,
    }
    .into();
    assert_eq!(s.value(), 21.5);
    s.set_value(22.0f32);
    assert_eq!(s.value(), 22.0);
}

#[test]
fn explicit_setter() {
    let mut s: Sensor = Hygrometer {
        value: 40.0,
        calibration: 1.0,
        unit: "%",
    }
    .into();
    assert_eq!(s.unit(), "%");
    s.set_unit("RH");
    assert_eq!(s.unit(), "RH");
    s = Thermometer {
        celsius: 0.0,
        calibration: 0.0,
    }
    .into();
    s.set_unit("K");
    assert_eq!(s.unit(), "C");
}

mod reexported {
    pub use superstruct as engine;
}

#[superstruct(crate = crate::reexported::engine)]
mod renamed_crate {
    pub struct A {
        pub n: u8,
    }
    pub struct B {
        pub n: u8,
    }

    #[superstruct]
    pub enum W {
        A,
        B,
    }
}

#[test]
fn crate_path() {
    use superstruct::SuperStruct;
    let w: renamed_crate::W = renamed_crate::B { n: 4 }.into();
    assert_eq!(w.n(), 4);
    assert_eq!(w.subtype_name(), "B");
}
