use superstruct::{superstruct, Visit};

#[superstruct]
mod meters {
    pub struct Gauge {
        pub n: u8,
    }

    impl Gauge {
        pub fn n(&self, by: u8) -> u8 {
            self.n + by
        }

        pub fn set_n(&mut self, a: u8, b: u8) {
            self.n = a + b;
        }

        pub fn visit(&self) -> u8 {
            1
        }
    }

    pub struct Dial {
        pub n: u8,
    }

    impl Dial {
        pub fn n(&self, by: u8) -> u8 {
            self.n * by
        }

        pub fn set_n(&mut self, a: u8, b: u8) {
            self.n = a * b;
        }

        pub fn visit(&self) -> u8 {
            2
        }
    }

    #[superstruct]
    pub enum Meter {
        Gauge,
        Dial,
    }
}

use meters::*;

#[test]
fn read_wins_over_call() {
    let m: Meter = Gauge { n: 4 }.into();
    assert_eq!(m.n(), 4);
    let m: Meter = Dial { n: 5 }.into();
    assert_eq!(m.n(), 5);
}

#[test]
fn field_setter_wins_over_two_argument_method() {
    let mut m: Meter = Gauge { n: 0 }.into();
    m.set_n(7u8);
    assert_eq!(m.n(), 7);
    let mut m: Meter = Dial { n: 0 }.into();
    m.set_n(9u8);
    assert_eq!(m.n(), 9);
}

struct Which;

impl Visit<Gauge> for Which {
    type Output = &'static str;
    fn visit(self, _: &Gauge) -> &'static str {
        "gauge"
    }
}

impl Visit<Dial> for Which {
    type Output = &'static str;
    fn visit(self, _: &Dial) -> &'static str {
        "dial"
    }
}

#[test]
fn visit_stays_the_wrapper_method() {
    let m: Meter = Dial { n: 0 }.into();
    assert_eq!(m.visit(Which), "dial");
    let m: Meter = Gauge { n: 0 }.into();
    assert_eq!(m.visit(Which), "gauge");
}
