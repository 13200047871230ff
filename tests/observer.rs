use core::{
    cell::RefCell,
    fmt::Debug,
    hash::{Hash, Hasher},
    mem,
    pin::Pin,
    ptr::{self, NonNull},
};
use observer_ptr::Observer;
use std::{
    collections::{hash_map::DefaultHasher, BTreeSet, HashSet},
    rc::Rc,
    sync::Arc,
    thread,
};

fn hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn address(observer: impl Into<Observer<i32>>) -> *const i32 {
    observer.into().as_ptr()
}

#[test]
fn default_constructs_to_null() {
    let observer = Observer::<i32>::default();
    assert!(observer.is_null());
    assert_eq!(observer.get(), None);
    assert_eq!(observer.as_ptr(), ptr::null());
}

#[test]
fn can_be_constructed_from_null() {
    assert!(Observer::<i32>::null().is_null());
    assert!(Observer::from(ptr::null::<i32>()).is_null());
    assert!(Observer::from(ptr::null_mut::<i32>()).is_null());
    assert!(Observer::<i32>::from(None).is_null());
    assert_eq!(address(Observer::null()), ptr::null());
    assert_eq!(address(ptr::null::<i32>()), ptr::null());
}

#[test]
fn can_be_constructed_from_raw_pointer() {
    let x = 1;
    let pointer = &x as *const i32;
    let observer = Observer::from(pointer);
    assert!(!observer.is_null());
    assert_eq!(observer.as_ptr(), pointer);
    let observer: Observer<i32> = pointer.into();
    assert_eq!(observer.as_ptr(), pointer);
    assert_eq!(address(pointer), pointer);

    let mut y = 2;
    let pointer = &mut y as *mut i32;
    assert_eq!(Observer::from(pointer).as_mut_ptr(), pointer);
    let non_null = NonNull::from(&x);
    assert_eq!(Observer::from(non_null).get(), Some(non_null));
    assert_eq!(Observer::from_non_null(Some(non_null)).get(), Some(non_null));
}

#[test]
fn is_null_only_for_a_null_address() {
    let values = [1, 2, 3];
    let pointers = values
        .iter()
        .map(|value| value as *const i32)
        .chain([ptr::null()]);
    for pointer in pointers {
        let observer = Observer::from(pointer);
        assert_eq!(observer.is_null(), pointer.is_null());
        assert_eq!(observer.as_ptr(), pointer);
    }
}

#[test]
fn can_be_constructed_from_reference() {
    let x = 1;
    assert_eq!(Observer::new(&x).as_ptr(), &x as *const i32);
    assert_eq!(Observer::<i32>::from(&&x).as_ptr(), &x as *const i32);
    assert_eq!(Observer::<i32>::of(&&x).as_ptr(), &x as *const i32);
    assert_eq!(address(&&x), &x as *const i32);

    let mut y = 2;
    let pointer = &mut y as *mut i32;
    let unique = &mut y;
    assert_eq!(Observer::<i32>::from(&unique).as_mut_ptr(), pointer);
}

#[test]
fn can_be_dereferenced() {
    let x = 5;
    let observer = Observer::new(&x);
    assert!(ptr::eq(unsafe { observer.borrow() }, &x));
    assert_eq!(unsafe { *observer.borrow() }, 5);
}

#[test]
fn can_be_mutably_dereferenced() {
    let mut x = 5;
    let mut observer = Observer::from(&mut x as *mut i32);
    unsafe { *observer.borrow_mut() = 6 };
    assert_eq!(x, 6);
}

#[test]
fn has_member_access() {
    struct X {
        data: i32,
    }

    let x = X { data: 42 };
    let observer = Observer::new(&x);
    assert_eq!(observer.pointee().as_ptr().cast_const(), &x as *const X);
    assert_eq!(unsafe { observer.pointee().as_ref() }.data, 42);
}

#[test]
#[should_panic]
fn borrow_of_null_panics() {
    let observer = Observer::<i32>::null();
    let _ = unsafe { observer.borrow() };
}

#[test]
#[should_panic]
fn pointee_of_null_panics() {
    Observer::<i32>::null().pointee();
}

#[test]
fn can_be_copied() {
    struct X(u8);

    let x = X(1);
    let first = Observer::new(&x);
    let second = first;
    #[allow(clippy::clone_on_copy)]
    let third = first.clone();
    assert_eq!(first.as_ptr(), &x as *const X);
    assert_eq!(second.as_ptr(), &x as *const X);
    assert_eq!(third.as_ptr(), &x as *const X);
    assert!(!first.is_null());
    assert!(!second.is_null());
}

#[test]
fn can_be_assigned() {
    struct X(u8);

    let x = X(1);
    let first = Observer::new(&x);
    let mut second = Observer::null();
    assert!(second.is_null());
    second = first;
    assert_eq!(first.as_ptr(), &x as *const X);
    assert_eq!(second.as_ptr(), &x as *const X);
    assert!(!second.is_null());
}

#[test]
fn can_be_swapped() {
    struct Y(u8);

    let (y1, y2) = (Y(1), Y(2));
    let mut first = Observer::new(&y1);
    let mut second = Observer::new(&y2);

    first.swap(&mut second);
    assert_eq!(first.as_ptr(), &y2 as *const Y);
    assert_eq!(second.as_ptr(), &y1 as *const Y);

    mem::swap(&mut first, &mut second);
    assert_eq!(first.as_ptr(), &y1 as *const Y);
    assert_eq!(second.as_ptr(), &y2 as *const Y);
}

#[test]
fn swap_with_null() {
    let y = 1;
    let mut first = Observer::new(&y);
    let mut second = Observer::null();
    first.swap(&mut second);
    assert!(first.is_null());
    assert_eq!(second.as_ptr(), &y as *const i32);
}

#[test]
fn equality() {
    struct Z(u8);

    let (z1, z2) = (Z(1), Z(2));
    let mut first = Observer::new(&z1);
    let mut second = Observer::new(&z2);
    assert_ne!(first, second);
    assert!(first != second);

    first = second;
    assert_eq!(first, second);
    assert_ne!(first, Observer::null());
    assert_ne!(Observer::null(), first);

    second = Observer::null();
    assert_eq!(second, Observer::null());
    assert_eq!(Observer::<Z>::null(), Observer::default());
    assert_eq!(first, first);
    assert_eq!(Observer::new(&z2), Observer::from(&z2 as *const Z));
}

#[test]
fn can_be_reset() {
    struct A(u8);

    let a = A(1);
    let mut observer = Observer::<A>::null();

    observer.replace(&a as *const A);
    assert_eq!(observer.as_ptr(), &a as *const A);
    assert!(ptr::eq(unsafe { observer.borrow() }, &a));

    observer.reset();
    assert!(observer.is_null());

    observer.replace(&a as *const A);
    let previous = observer.replace(ptr::null::<A>());
    assert!(observer.is_null());
    assert_eq!(previous.as_ptr(), &a as *const A);
}

#[test]
fn replace_accepts_pointer_like_types() {
    let shared = Rc::new(1);
    let unique = Box::new(2);
    let mut observer = Observer::<i32>::null();
    assert!(observer.replace(&shared).is_null());
    assert_eq!(observer.as_ptr(), Rc::as_ptr(&shared));
    observer.replace(&unique);
    assert_eq!(observer.as_ptr(), &*unique as *const i32);
}

#[test]
fn has_ordering_comparisons() {
    let x = [1, 2];
    let first = Observer::new(&x[0]);
    let second = Observer::new(&x[1]);

    assert!(first < second);
    assert!(first <= second);
    assert!(!(second < first));
    assert!(!(second <= first));
    assert!(second > first);
    assert!(second >= first);
    assert!(!(first > second));
    assert!(!(first >= second));

    let third = first;
    assert!(!(first < third));
    assert!(!(third < first));
    assert!(first <= third);
    assert!(third <= first);
    assert!(!(first > third));
    assert!(!(third > first));
    assert!(first >= third);
    assert!(third >= first);

    let null = Observer::null();
    assert!((null < first) != (first < null));
    assert!((null > first) != (first > null));
    assert_eq!(null < first, first > null);
    assert_eq!(null > first, first < null);
    assert_eq!(null <= first, first >= null);
    assert_eq!(null >= first, first <= null);
    assert_eq!(null >= first, first < null);
    assert_eq!(null <= first, first > null);
}

#[test]
fn orders_like_raw_addresses() {
    let values = [4u16, 3, 2, 1];
    let mut observers = values.iter().rev().map(Observer::new).collect::<Vec<_>>();
    observers.push(Observer::null());
    observers.sort();
    assert!(observers[0].is_null());
    for pair in observers.windows(2) {
        assert!(pair[0].as_ptr() < pair[1].as_ptr());
    }
}

#[test]
fn can_be_explicitly_converted_to_raw_pointer() {
    let mut x = 1;
    let pointer = &mut x as *mut i32;
    let observer = Observer::from(pointer);
    assert_eq!(<*const i32>::from(observer), pointer.cast_const());
    assert_eq!(<*mut i32>::from(observer), pointer);
    assert_eq!(Option::<NonNull<i32>>::from(observer), NonNull::new(pointer));
    assert_eq!(<*const i32>::from(Observer::null()), ptr::null());
}

#[test]
fn has_hash() {
    struct X(u8);

    let x = X(1);
    let observer = Observer::new(&x);
    assert_eq!(hash(&observer), hash(&(&x as *const X)));
    assert_eq!(hash(&observer), hash(&Observer::from(&x as *const X)));
    assert_eq!(hash(&Observer::<X>::null()), hash(&ptr::null::<X>()));
}

#[test]
fn can_be_constructed_from_rc() {
    let shared = Rc::new(123);
    let observer = Observer::<i32>::from(&shared);
    assert_eq!(observer.as_ptr(), Rc::as_ptr(&shared));
    assert_eq!(unsafe { *observer.borrow() }, 123);
    assert_eq!(address(&shared), Rc::as_ptr(&shared));
    assert_eq!(Rc::strong_count(&shared), 1);
}

#[test]
fn can_be_constructed_from_arc() {
    let shared = Arc::new(456);
    let observer: Observer<i32> = (&shared).into();
    assert_eq!(observer.as_ptr(), Arc::as_ptr(&shared));
    assert_eq!(address(&shared), Arc::as_ptr(&shared));
    assert_eq!(Arc::strong_count(&shared), 1);
}

#[test]
fn can_be_constructed_from_box() {
    let unique = Box::new(789);
    assert_eq!(address(&unique), &*unique as *const i32);
    assert_eq!(unsafe { *Observer::<i32>::from(&unique).borrow() }, 789);
}

#[test]
fn can_be_constructed_from_pin() {
    let pinned: Pin<Box<i32>> = Box::pin(1);
    assert_eq!(address(&pinned), &*pinned as *const i32);
}

#[test]
fn can_be_constructed_from_cell_guards() {
    let cell = RefCell::new(1);
    {
        let guard = cell.borrow();
        assert_eq!(address(&guard), cell.as_ptr().cast_const());
    }
    let guard = cell.borrow_mut();
    assert_eq!(address(&guard), cell.as_ptr().cast_const());
}

#[test]
fn can_observe_unsized_values() {
    let text = "observer";
    let observer = Observer::<str>::from(&text);
    assert_eq!(unsafe { observer.borrow() }, "observer");
    assert_eq!(observer, Observer::new(text));

    let bytes: Box<[u8]> = Box::new([1, 2, 3]);
    let observer = Observer::<[u8]>::from(&bytes);
    assert_eq!(unsafe { observer.borrow() }, &[1, 2, 3]);
}

#[test]
fn equality_ignores_metadata() {
    let values = [1u8, 2, 3];
    let whole = Observer::new(&values[..]);
    let prefix = Observer::new(&values[..1]);
    assert_eq!(whole, prefix);
    assert_eq!(hash(&whole), hash(&prefix));
}

#[test]
fn upcast_keeps_the_address() {
    #[derive(Debug)]
    struct Derived(u8);

    let derived = Derived(1);
    let narrow = Observer::new(&derived);
    let wide = narrow.upcast::<dyn Debug>();
    assert_eq!(
        wide.get().map(|pointer| pointer.as_ptr() as *const ()),
        Some(&derived as *const Derived as *const ())
    );
    assert_eq!(wide, Observer::<dyn Debug>::from(&&derived));
    assert_eq!(hash(&wide), hash(&narrow));

    let mut other = Observer::<dyn Debug>::null();
    assert!(other.is_null());
    other = narrow.upcast();
    assert_eq!(other, wide);
    assert!(Observer::<Derived>::null().upcast::<dyn Debug>().is_null());
}

#[test]
fn can_be_used_as_set_key() {
    let values = [1, 2, 3];
    let ordered = values.iter().map(Observer::new).collect::<BTreeSet<_>>();
    let hashed = values.iter().map(Observer::new).collect::<HashSet<_>>();
    assert_eq!(ordered.len(), 3);
    assert_eq!(hashed.len(), 3);
    for value in &values {
        assert!(ordered.contains(&Observer::new(value)));
        assert!(hashed.contains(&Observer::from(value as *const i32)));
    }
    assert!(!hashed.contains(&Observer::null()));
}

#[test]
fn can_be_sent_to_thread() {
    let shared = Arc::new(7);
    let observer = Observer::<i32>::from(&shared);
    let value = thread::scope(|scope| {
        scope
            .spawn(move || unsafe { *observer.borrow() })
            .join()
            .unwrap()
    });
    assert_eq!(value, 7);
}

#[test]
fn formats_its_address() {
    let x = 1;
    let observer = Observer::new(&x);
    assert_eq!(format!("{observer:p}"), format!("{:p}", &x as *const i32));
    assert!(format!("{observer:?}").starts_with("Observer(0x"));
    assert_eq!(
        format!("{:p}", Observer::<i32>::null()),
        format!("{:p}", ptr::null::<()>())
    );
}

#[test]
fn does_not_own_the_pointee() {
    let shared = Rc::new(String::from("owned"));
    let observer = Observer::<String>::from(&shared);
    drop(observer);
    assert_eq!(Rc::strong_count(&shared), 1);
    assert_eq!(*shared, "owned");
}

#[test]
fn scenario() {
    let null = Observer::<i32>::null();
    assert!(null.is_null());

    let x = 42;
    assert_eq!(unsafe { *Observer::new(&x).borrow() }, 42);

    let shared = Rc::new(123);
    assert_eq!(unsafe { *Observer::<i32>::from(&shared).borrow() }, 123);
}

macro_rules! pointer_like {
    ($($name: ident: $make: expr),* $(,)?) => {
        $(
            mod $name {
                use super::*;

                #[test]
                fn observes_the_pointee() {
                    let pointer = $make(11);
                    let observer = Observer::<i32>::from(&pointer);
                    assert_eq!(observer.as_ptr(), &*pointer as *const i32);
                    assert_eq!(unsafe { *observer.borrow() }, 11);
                }

                #[test]
                fn upcasts_while_observing() {
                    let pointer = $make(12);
                    let observer = Observer::<dyn Debug>::of(&pointer);
                    assert_eq!(observer, Observer::new(&*pointer).upcast());
                    assert_eq!(format!("{:?}", unsafe { observer.borrow() }), "12");
                }

                #[test]
                fn is_copied_not_shared() {
                    let pointer = $make(13);
                    let first = Observer::<i32>::from(&pointer);
                    let mut second = first;
                    second.reset();
                    assert!(!first.is_null());
                    assert!(second.is_null());
                }
            }
        )*
    };
}

pointer_like!(
    boxed: Box::new,
    counted: Rc::new,
    atomic: Arc::new,
    pinned: Box::pin,
);
