//! Converting between wrappers: narrowing, reordering and ownership changes.

use raspberry::prelude::*;

operation! {
    pub trait Name {
        fn name(&self) -> String;
    }
}

operation! {
    pub trait Legs {
        fn legs(&self) -> u32;
    }
}

operation! {
    pub trait Rename {
        fn rename(&mut self, name: &'static str);
    }
}

interface! {
    pub struct Named { Name }
}

interface! {
    pub struct Animal { ..Named, Legs }
}

interface! {
    pub struct LegsThenName { Legs, Name }
}

interface! {
    pub struct Pet { ..Animal, Rename }
}

interface! {
    pub struct Walker { Legs }
}

pub struct Cat {
    name: &'static str,
}

impl Name for Cat {
    fn name(&self) -> String {
        self.name.to_owned()
    }
}

impl Legs for Cat {
    fn legs(&self) -> u32 {
        4
    }
}

impl Rename for Cat {
    fn rename(&mut self, name: &'static str) {
        self.name = name;
    }
}

pub struct Robot;

impl Legs for Robot {
    fn legs(&self) -> u32 {
        6
    }
}

#[test]
fn test_narrow_to_base_interface() {
    let pet: Any<'_, Pet> = Any::new(Cat { name: "tom" });
    let animal: Any<'_, Animal> = pet.narrow();
    assert_eq!(animal.legs(), 4);

    let named: Any<'_, Named> = animal.narrow();
    assert_eq!(named.name(), "tom");
}

#[test]
fn test_convert_between_unrelated_interfaces() {
    let animal: Any<'_, Animal> = Any::new(Cat { name: "tom" });
    let reordered = Any::<LegsThenName>::from_any(animal);
    assert_eq!(reordered.legs(), 4);
    assert_eq!(reordered.name(), "tom");

    let back: Any<'_, Animal> = Any::from_any(reordered);
    assert_eq!(back.name(), "tom");
}

#[test]
fn test_narrowing_keeps_the_object() {
    let mut pet: Any<'_, Pet> = Any::new(Cat { name: "tom" });
    pet.rename("felix");

    let walker: Any<'_, Walker> = pet.narrow();
    let robot: Any<'_, Walker> = Any::new(Robot);
    assert_eq!(walker.legs() + robot.legs(), 10);
}

#[test]
fn test_narrowing_keeps_the_storage_mode() {
    let shared: Any<'_, Pet, Shared> = Any::from_arc(triomphe::Arc::new(Cat { name: "tom" }));
    let named: Any<'_, Named, Shared> = shared.narrow();
    assert_eq!(named.storage_mode(), StorageMode::Shared);
    assert_eq!(named.strong_count(), Some(1));

    let mut cat = Cat { name: "tom" };
    {
        let mut exclusive: Any<'_, Pet, Exclusive> = Any::from_mut(&mut cat);
        exclusive.rename("felix");
        let named: Any<'_, Named, Exclusive> = exclusive.narrow();
        assert_eq!(named.storage_mode(), StorageMode::Reference);
        assert_eq!(named.name(), "felix");
    }
    assert_eq!(cat.name, "felix");
}

#[test]
fn test_narrow_a_borrowed_view() {
    let mut pet: Any<'_, Pet> = Any::new(Cat { name: "tom" });
    {
        let mut view = pet.as_mut();
        view.rename("felix");
        let walker = view.narrow::<Walker>();
        assert_eq!(walker.legs(), 4);
    }

    let named = pet.as_ref().narrow::<Named>();
    assert_eq!(named.name(), "felix");
}

#[test]
fn test_share_and_reclaim_ownership() {
    let mut pet: Any<'_, Pet> = Any::new(Cat { name: "tom" });
    pet.rename("felix");

    let shared = pet.into_shared();
    assert_eq!(shared.storage_mode(), StorageMode::Shared);

    let second = shared.clone();
    assert_eq!(second.name(), "felix");

    let shared = match shared.try_into_owned() {
        Ok(_) => panic!("another handle is alive"),
        Err(shared) => shared,
    };
    drop(second);

    let mut owned = match shared.try_into_owned() {
        Ok(owned) => owned,
        Err(_) => panic!("the last handle owns the object"),
    };
    owned.rename("tom");
    assert_eq!(owned.name(), "tom");
    assert_eq!(owned.storage_mode(), StorageMode::Unique);
}

#[test]
fn test_shared_from_exclusive_stays_borrowed() {
    let mut cat = Cat { name: "tom" };
    let shared = Any::<Pet, Exclusive>::from_mut(&mut cat).into_shared();
    assert_eq!(shared.storage_mode(), StorageMode::Reference);
    assert_eq!(shared.strong_count(), None);
    assert!(shared.try_into_owned().is_err());
}
