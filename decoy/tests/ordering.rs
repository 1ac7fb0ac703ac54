// vim: tw=80
//! Ordered and unordered groups of expectations
#![deny(warnings)]

use decoy::*;

fn call(turtle: &MockObject, method: &'static str) {
    turtle.invoke(turtle.call(method));
}

#[test]
fn in_order() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("pen_down");
        mockery.expect(&turtle).method("forward");
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "pen_down");
    call(&turtle, "forward");
    call(&turtle, "pen_up");
}

#[test]
#[should_panic(expected = "unexpected invocation: turtle.forward()")]
fn out_of_order() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("pen_down");
        mockery.expect(&turtle).method("forward");
    }
    call(&turtle, "forward");
}

/// An ordered group may not go back to an earlier expectation, even one that
/// could still be called
#[test]
#[should_panic(expected = "unexpected invocation: turtle.forward()")]
fn never_goes_back() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("forward").times(1..);
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "forward");
    call(&turtle, "forward");
    call(&turtle, "pen_up");
    call(&turtle, "forward");
}

/// Expectations that are already satisfied may be skipped
#[test]
fn skip_satisfied() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.allow(&turtle).method("home");
        mockery.expect(&turtle).method("forward").times(0..3);
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "pen_up");
}

#[test]
#[should_panic(expected = "unexpected invocation: turtle.pen_up()")]
fn skip_unsatisfied() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("forward");
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "pen_up");
}

/// Ordering applies across mock objects too
#[test]
#[should_panic(expected = "unexpected invocation: screen.draw()")]
fn several_objects() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    let screen = mockery.mock::<MockObject>("screen");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("forward");
        mockery.expect(&screen).method("draw");
    }
    call(&screen, "draw");
}

#[test]
fn unordered_inside_ordered() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("pen_down");
        {
            let _u = mockery.unordered();
            mockery.expect(&turtle).method("forward");
            mockery.expect(&turtle).method("turn");
        }
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "pen_down");
    call(&turtle, "turn");
    call(&turtle, "forward");
    call(&turtle, "pen_up");
}

/// The ordered group following an unordered group may not start until the
/// whole unordered group is satisfied
#[test]
#[should_panic(expected = "unexpected invocation: turtle.pen_up()")]
fn unordered_inside_ordered_incomplete() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        {
            let _u = mockery.unordered();
            mockery.expect(&turtle).method("forward");
            mockery.expect(&turtle).method("turn");
        }
        mockery.expect(&turtle).method("pen_up");
    }
    call(&turtle, "turn");
    call(&turtle, "pen_up");
}

/// Expectations declared after the guard is dropped are unordered again
#[test]
fn unordered_after_guard() {
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("pen_down");
    }
    mockery.expect(&turtle).method("forward");
    call(&turtle, "forward");
    call(&turtle, "pen_down");
}

/// The first matching expectation wins, so a specific expectation should be
/// declared before a general one
#[test]
fn first_match_wins() {
    let mockery = Mockery::new();
    let dice = mockery.mock::<MockObject>("dice");
    mockery.expect(&dice)
        .method("roll")
        .with(vec![matcher::eq(20u32)])
        .return_const(20u32);
    mockery.allow(&dice).method("roll").return_const(4u32);
    let roll = |sides: u32| {
        dice.returned::<u32>(dice.invoke(dice.call("roll").arg("sides", sides)))
    };
    assert_eq!(4, roll(6));
    assert_eq!(20, roll(20));
    assert_eq!(4, roll(20));
}
