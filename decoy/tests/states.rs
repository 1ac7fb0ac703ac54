// vim: tw=80
//! State machines as preconditions and postconditions of expectations
#![deny(warnings)]

use decoy::*;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering}
};

fn call(turtle: &MockObject, method: &'static str) {
    turtle.invoke(turtle.call(method));
}

#[test]
fn when_and_then() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    mockery.expect(&turtle)
        .method("pen_down")
        .when(pen.is("up"))
        .then(pen.is("down"));
    mockery.expect(&turtle)
        .method("forward")
        .times(1..)
        .when(pen.is("down"));
    mockery.expect(&turtle)
        .method("pen_up")
        .when(pen.is("down"))
        .then(pen.is("up"));
    call(&turtle, "pen_down");
    assert!(pen.is_in("down"));
    call(&turtle, "forward");
    call(&turtle, "forward");
    call(&turtle, "pen_up");
    assert_eq!(Some("up".to_owned()), pen.current());
}

#[test]
#[should_panic(expected = "precondition pen is down is false")]
fn precondition_fails() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    mockery.allow(&turtle).method("forward").when(pen.is("down"));
    call(&turtle, "forward");
}

#[test]
fn is_not() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen");
    mockery.expect(&turtle).method("forward").when(pen.is_not("up"));
    // A machine with no current state is not in any state
    call(&turtle, "forward");
}

#[test]
#[should_panic(expected = "precondition pen is not up is false")]
fn is_not_fails() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    mockery.allow(&turtle).method("forward").when(pen.is_not("up"));
    call(&turtle, "forward");
}

/// Without an initial state, `is` never holds
#[test]
#[should_panic(expected = "pen has no current state")]
fn no_initial_state() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen");
    mockery.allow(&turtle).method("forward").when(pen.is("up"));
    call(&turtle, "forward");
}

/// States let the same method behave differently over time
#[test]
fn select_by_state() {
    let mockery = Mockery::new();
    let door = mockery.mock::<MockObject>("door");
    let lock = mockery.states("lock").starts_as("locked");
    mockery.allow(&door)
        .method("open")
        .when(lock.is("locked"))
        .return_const(false);
    mockery.allow(&door)
        .method("open")
        .when(lock.is("unlocked"))
        .return_const(true);
    mockery.allow(&door)
        .method("unlock")
        .then(lock.is("unlocked"));
    let open = || door.returned::<bool>(door.invoke(door.call("open")));
    assert!(!open());
    call(&door, "unlock");
    assert!(open());
}

#[test]
fn set_directly() {
    let mockery = Mockery::new();
    let pen = mockery.states("pen").starts_as("up");
    pen.set("down");
    assert!(pen.is_in("down"));
    assert!(!pen.is_in("up"));
    assert_eq!("pen", pen.name());
}

/// Transitions happen before actions run, so actions observe the new state
#[test]
fn then_before_actions() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    let saw_down = Arc::new(AtomicBool::new(false));
    let saw_down2 = saw_down.clone();
    let down = pen.is("down");
    mockery.expect(&turtle)
        .method("pen_down")
        .then(down)
        .doing(move |_| saw_down2.store(pen.is_in("down"), Ordering::Relaxed));
    call(&turtle, "pen_down");
    assert!(saw_down.load(Ordering::Relaxed));
}

/// States survive a checkpoint
#[test]
fn checkpoint_keeps_state() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    mockery.expect(&turtle).method("pen_down").then(pen.is("down"));
    call(&turtle, "pen_down");
    mockery.checkpoint();
    assert!(pen.is_in("down"));
    mockery.expect(&turtle).method("forward").when(pen.is("down"));
    call(&turtle, "forward");
}

/// Machine ids are per-Mockery, so a state from another Mockery would
/// silently gate on an unrelated machine
#[test]
#[should_panic(expected = "State pen is down belongs to a different Mockery")]
fn foreign_state_in_when() {
    let other = Mockery::new();
    let pen = other.states("pen").starts_as("down");
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.states("ink").starts_as("full");
    mockery.allow(&turtle).method("forward").when(pen.is("down"));
}

#[test]
#[should_panic(expected = "State pen is up belongs to a different Mockery")]
fn foreign_state_in_then() {
    let other = Mockery::new();
    let pen = other.states("pen");
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.allow(&turtle).method("pen_up").then(pen.is("up"));
}

#[test]
fn states_compare_by_owner() {
    let a = Mockery::new();
    let b = Mockery::new();
    let pen_a = a.states("pen");
    let pen_b = b.states("pen");
    assert_eq!(pen_a.is("up"), pen_a.is("up"));
    assert_ne!(pen_a.is("up"), pen_a.is("down"));
    assert_ne!(pen_a.is("up"), pen_b.is("up"));
}
