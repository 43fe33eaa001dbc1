use superstruct::superstruct;

#[superstruct]
mod counters {
    #[derive(Debug, Default)]
    pub struct Small {
        pub count: u8,
        pub label: String,
    }

    impl Small {
        pub fn add(&mut self, by: u8) {
            self.count += by;
        }

        pub fn scaled(&self, factor: u8, offset: i16) -> i16 {
            self.count as i16 * factor as i16 + offset
        }

        pub fn greet(&self, name: &str) -> String {
            format!("{} from {}", name, self.label)
        }

        pub fn into_label(self) -> String {
            self.label
        }

        fn __internal(&self) -> u8 {
            0
        }
    }

    #[derive(Debug, Default)]
    pub struct Large {
        pub count: u64,
        pub label: String,
    }

    impl Large {
        pub fn add(&mut self, by: u64) {
            self.count += by;
        }

        pub fn scaled(&self, factor: u32, offset: i64) -> i64 {
            self.count as i64 * factor as i64 + offset
        }

        pub fn greet(&self, who: &str) -> String {
            format!("{} from {}", who, self.label)
        }

        pub fn into_label(self) -> String {
            self.label
        }

        pub fn __internal(&self) -> u64 {
            0
        }
    }

    #[superstruct]
    pub enum Counter {
        Small,
        Large,
    }
}

use counters::*;

#[test]
fn reads_widen_to_the_common_type() {
    let c: Counter = Small {
        count: 200,
        label: "s".to_owned(),
    }
    .into();
    let n: u64 = c.count();
    assert_eq!(n, 200);
    let c: Counter = Large {
        count: u64::MAX,
        label: "l".to_owned(),
    }
    .into();
    assert_eq!(c.count(), u64::MAX);
}

#[test]
fn arguments_convert_per_subtype() {
    let mut c: Counter = Small::default().into();
    c.add(3u8);
    c.set_count(5u8);
    c.add(1u8);
    assert_eq!(c.count(), 6);

    let mut c: Counter = Large::default().into();
    c.add(3u8);
    assert_eq!(c.count(), 3);
}

#[test]
fn multiple_arguments() {
    let c: Counter = Small {
        count: 2,
        label: String::new(),
    }
    .into();
    let scaled: i64 = c.scaled(3u8, -1i16);
    assert_eq!(scaled, 5);
    let c: Counter = Large {
        count: 2,
        label: String::new(),
    }
    .into();
    assert_eq!(c.scaled(10u8, 7i8), 27);
}

#[test]
fn borrowed_arguments_pass_through() {
    let c: Counter = Large {
        count: 0,
        label: "the large one".to_owned(),
    }
    .into();
    assert_eq!(c.greet("hello"), "hello from the large one");
}

#[test]
fn consuming_methods() {
    let c: Counter = Small {
        count: 0,
        label: "small".to_owned(),
    }
    .into();
    assert_eq!(c.into_label(), "small");
}

#[test]
fn labels_can_be_replaced() {
    let mut c: Counter = Small::default().into();
    c.set_label("new");
    assert_eq!(c.label(), "new");
}
