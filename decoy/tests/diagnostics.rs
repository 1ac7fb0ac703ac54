// vim: tw=80
//! The reports produced for unexpected invocations and failed verification
#![deny(warnings)]

use decoy::*;

fn quiet() -> Mockery {
    Mockery::with_config(Config {
        verify_on_drop: false,
        ..Default::default()
    })
}

fn unexpected(mock: &MockObject, call: Invocation) -> String {
    match mock.try_invoke(call) {
        Err(e @ MockError::UnexpectedInvocation { .. }) => e.to_string(),
        r => panic!("Unexpected result {:?}", r.map(|i| i.to_string()))
    }
}

#[test]
fn lists_expectations() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle)
        .method("forward")
        .with(vec![matcher::eq(5i32)]);
    mockery.allow(&turtle).method("pen_up").with_no_args();
    let msg = unexpected(&turtle, turtle.call("turn").arg("degrees", 90i32));
    assert_eq!(
        "unexpected invocation: turtle.turn(90)\n\
         expectations:\n  \
           expected once, never invoked: turtle.forward(var == 5)\n  \
           expected any number of times, never invoked: turtle.pen_up()\n",
        msg);
}

#[test]
fn no_expectations() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert_eq!(
        "unexpected invocation: turtle.forward()\nexpectations:\n  none\n",
        msg);
}

#[test]
fn explains_argument_mismatch() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle)
        .method("forward")
        .with(vec![matcher::gt(0i32)]);
    let call = turtle.call("forward").arg("distance", -3i32);
    let msg = unexpected(&turtle, call);
    assert!(msg.contains("why they did not match:\n  \
        expected once, never invoked: turtle.forward(var > 0)\n    \
        argument 0: "), "{}", msg);
}

#[test]
fn explains_argument_count() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle)
        .method("turn")
        .with(vec![matcher::anything()]);
    let msg = unexpected(&turtle, turtle.call("turn"));
    assert!(msg.contains("expected 1 arguments, but got 0"), "{}", msg);
}

#[test]
fn explains_exhaustion() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle).method("forward");
    turtle.invoke(turtle.call("forward"));
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains(
        "already invoked the maximum number of times (once)"), "{}", msg);
}

#[test]
fn explains_order() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    {
        let _g = mockery.ordered();
        mockery.expect(&turtle).method("pen_down");
        mockery.expect(&turtle).method("forward");
    }
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains("expectations:\n  in order:\n    expected once"),
            "{}", msg);
    assert!(msg.contains("not allowed at this point of an ordered group"),
            "{}", msg);
}

#[test]
fn explains_withf() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle)
        .method("forward")
        .withf(|args| args.len() == 2);
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains("turtle.forward(<withf>)"), "{}", msg);
    assert!(msg.contains("arguments rejected by withf"), "{}", msg);
}

/// Expectations for other objects or methods are listed, but not explained
#[test]
fn irrelevant_not_explained() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    let screen = mockery.mock::<MockObject>("screen");
    mockery.expect(&screen).method("forward");
    mockery.expect(&turtle).method("turn");
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains("screen.forward(..)"), "{}", msg);
    assert!(!msg.contains("why they did not match"), "{}", msg);
}

#[test]
fn lists_states() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    let pen = mockery.states("pen").starts_as("up");
    let _color = mockery.states("color");
    mockery.expect(&turtle)
        .method("pen_down")
        .when(pen.is("up"))
        .then(pen.is("down"));
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains(
        "turtle.pen_down(..); when pen is up; then pen is down\n"),
        "{}", msg);
    assert!(msg.contains(
        "states:\n  pen is up\n  color has no current state\n"), "{}", msg);
}

#[test]
fn lists_sequences() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    let seq = mockery.sequence("drawing");
    mockery.expect(&turtle).method("pen_down").in_sequence(&seq);
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains("turtle.pen_down(..); in sequence \"drawing\""),
            "{}", msg);
}

#[test]
fn lists_history() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.allow(&turtle).method("pen_down");
    turtle.invoke(turtle.call("pen_down"));
    let mut buf = vec![0u8; 2];
    buf[1] = 7;
    turtle.invoke(turtle.call("pen_down").arg_ref("buf", buf));
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.ends_with("what happened before this:\n  \
        turtle.pen_down()\n  \
        turtle.pen_down(&mut [0, 7])\n"), "{}", msg);
}

#[test]
fn no_history() {
    let mockery = Mockery::with_config(Config {
        verify_on_drop: false,
        history_limit: 0,
    });
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.allow(&turtle).method("pen_down");
    turtle.invoke(turtle.call("pen_down"));
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(!msg.contains("what happened before this"), "{}", msg);
}

#[test]
fn method_matching() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.allow(&turtle)
        .method_matching(matcher::str_starts_with("pen_"));
    turtle.invoke(turtle.call("pen_up"));
    turtle.invoke(turtle.call("pen_down"));
    let msg = unexpected(&turtle, turtle.call("forward"));
    assert!(msg.contains("turtle.<method "), "{}", msg);
    assert!(msg.contains("starts_with"), "{}", msg);
}

#[test]
fn unsatisfied() {
    let mockery = quiet();
    let turtle = mockery.mock::<MockObject>("turtle");
    mockery.expect(&turtle).method("forward").times(2);
    turtle.invoke(turtle.call("forward"));
    let e = mockery.try_verify().unwrap_err();
    assert_eq!(
        "not all expectations were satisfied\n\
         expectations:\n  \
           expected exactly 2 times, invoked once: turtle.forward(..)\n",
        e.to_string());
}
