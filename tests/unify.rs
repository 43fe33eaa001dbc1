use superstruct::{superstruct, SuperStruct};

#[superstruct]
mod records {
    #[derive(Clone, Debug, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: i32,
    }

    impl Person {
        pub fn id(&self) -> i32 {
            self.age
        }

        pub fn weight(&self) -> i32 {
            70
        }

        pub fn touch(&mut self) {
            self.age += 1;
        }

        pub fn renamed(&self, name: &str) -> Self {
            Person {
                name: name.to_owned(),
                age: self.age,
            }
        }

        pub fn title(&self) -> &str {
            &self.name
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct Company {
        pub name: String,
        pub age: i32,
        pub staff: Vec<Person>,
    }

    impl Company {
        pub fn id(&self) -> String {
            format!("company:{}", self.name)
        }

        pub fn weight(&self) -> i64 {
            self.staff.len() as i64 * 70
        }

        pub fn touch(&mut self) {
            for person in &mut self.staff {
                person.touch();
            }
        }

        pub fn renamed(&self, name: &str) -> Self {
            Company {
                name: name.to_owned(),
                ..self.clone()
            }
        }

        pub fn title(&self) -> String {
            self.name.to_uppercase()
        }
    }

    #[superstruct(nested_derive(Debug, PartialEq))]
    #[derive(Debug, PartialEq)]
    pub enum Entity {
        Person,
        Company,
    }
}

use records::*;

fn alice() -> Person {
    Person {
        name: "alice".to_owned(),
        age: 30,
    }
}

fn acme() -> Company {
    Company {
        name: "acme".to_owned(),
        age: 3,
        staff: vec![alice()],
    }
}

#[test]
fn integers_promote() {
    let e: Entity = alice().into();
    let w: i64 = e.weight();
    assert_eq!(w, 70);
    let e: Entity = acme().into();
    assert_eq!(e.weight(), 70);
}

#[test]
fn distinct_returns_give_a_nested_wrapper() {
    let e: Entity = alice().into();
    assert_eq!(e.id(), EntityId::I32(30));
    let e: Entity = acme().into();
    assert_eq!(e.id(), EntityId::String("company:acme".to_owned()));
    assert_eq!(e.id().subtype_name(), "String");
    assert_eq!(<EntityId as SuperStruct>::SUBTYPES, &["i32", "String"]);
}

#[test]
fn self_returns_give_the_wrapper() {
    let e: Entity = acme().into();
    let renamed: Entity = e.renamed("initech");
    assert_eq!(renamed.name(), "initech");
    assert!(renamed.is::<Company>());
    let e: Entity = alice().into();
    assert_eq!(e.renamed("bob"), Entity::Person(Person {
        name: "bob".to_owned(),
        age: 30,
    }));
}

#[test]
fn borrowed_and_owned_strings() {
    let e: Entity = alice().into();
    let title: String = e.title();
    assert_eq!(title, "alice");
    let e: Entity = acme().into();
    assert_eq!(e.title(), "ACME");
}

#[test]
fn unit_returns() {
    let mut e: Entity = acme().into();
    e.touch();
    match e {
        Entity::Company(company) => assert_eq!(company.staff[0].age, 31),
        _ => unreachable!(),
    }
    let mut e: Entity = alice().into();
    e.touch();
    assert_eq!(e.age(), 31);
}

#[superstruct]
mod static_first {
    pub struct Fixed;
    pub struct Named {
        pub text: String,
    }

    impl Fixed {
        pub fn label(&self) -> &'static str {
            "fixed"
        }
    }

    impl Named {
        pub fn label(&self) -> &str {
            &self.text
        }
    }

    #[superstruct]
    pub enum Labelled {
        Fixed,
        Named,
    }
}

#[superstruct]
mod elided_first {
    pub struct Named {
        pub text: String,
    }
    pub struct Fixed;

    impl Named {
        pub fn label(&self) -> &str {
            &self.text
        }
    }

    impl Fixed {
        pub fn label(&self) -> &'static str {
            "fixed"
        }
    }

    #[superstruct]
    pub enum Labelled {
        Named,
        Fixed,
    }
}

#[test]
fn borrows_with_different_lifetimes_become_owned() {
    let l: static_first::Labelled = static_first::Fixed.into();
    let label: String = l.label();
    assert_eq!(label, "fixed");
    let l: static_first::Labelled = static_first::Named {
        text: "n".to_owned(),
    }
    .into();
    assert_eq!(l.label(), "n");

    let l: elided_first::Labelled = elided_first::Fixed.into();
    let label: String = l.label();
    assert_eq!(label, "fixed");
    let l: elided_first::Labelled = elided_first::Named {
        text: "n".to_owned(),
    }
    .into();
    assert_eq!(l.label(), "n");
}
