// vim: tw=80
//! Mock objects generated by #[mockable]
#![deny(warnings)]

use decoy::*;

#[mockable]
trait Turtle {
    fn forward(&self, distance: i32);
    fn turn(&mut self, degrees: i32);
    fn position(&self) -> (i32, i32);
}

#[mockable]
pub trait Store {
    fn put(&mut self, key: &str, value: u32);
    fn get(&self, key: &str) -> Option<u32>;
    fn fill(&self, buf: &mut Vec<u8>) -> usize;
}

#[mockable(FakeClock)]
trait Clock {
    fn now(&self) -> u64;
}

#[mockable]
unsafe trait Raw {
    fn peek(&self, addr: usize) -> u8;
}

#[mockable]
trait Lexer<'a> {
    fn r#match(&self, r#type: u8) -> bool;
    fn token<'b>(&self, input: &'b str) -> u32;
}

#[test]
fn by_value() {
    let mockery = Mockery::new();
    let mut turtle = MockTurtle::new(&mockery, "turtle");
    mockery.expect(&turtle)
        .method("forward")
        .with(vec![matcher::eq(10i32)]);
    mockery.expect(&turtle)
        .method("turn")
        .with_args([90i32]);
    mockery.allow(&turtle).method("position").return_const((0i32, 10i32));
    turtle.forward(10);
    turtle.turn(90);
    assert_eq!((0, 10), turtle.position());
}

#[test]
fn as_trait_object() {
    fn walk(t: &dyn Turtle) -> (i32, i32) {
        t.forward(5);
        t.position()
    }
    let mockery = Mockery::new();
    let turtle = mockery.mock::<MockTurtle>("turtle");
    mockery.expect(&turtle).method("forward");
    mockery.expect(&turtle).method("position").return_const((5i32, 0i32));
    assert_eq!((5, 0), walk(&turtle));
}

#[test]
fn str_arguments() {
    let mockery = Mockery::new();
    let mut store = MockStore::new(&mockery, "store");
    mockery.expect(&store)
        .method("put")
        .with(vec![matcher::eq("x"), matcher::eq(5u32)]);
    mockery.expect(&store)
        .method("get")
        .with(vec![matcher::str_starts_with("x")])
        .return_const(Some(5u32));
    store.put("x", 5);
    assert_eq!(Some(5), store.get("x"));
}

#[test]
fn mut_ref_arguments() {
    let mockery = Mockery::new();
    let store = MockStore::new(&mockery, "store");
    mockery.expect(&store)
        .method("fill")
        .with(vec![matcher::eq(vec![9u8])])
        .set_arg(0, vec![1u8, 2])
        .return_const(2usize);
    let mut buf = vec![9];
    assert_eq!(2, store.fill(&mut buf));
    assert_eq!(vec![1, 2], buf);
}

#[test]
fn mut_ref_arguments_untouched() {
    let mockery = Mockery::new();
    let store = MockStore::new(&mockery, "store");
    mockery.expect(&store).method("fill").return_const(0usize);
    let mut buf = vec![9];
    assert_eq!(0, store.fill(&mut buf));
    assert_eq!(vec![9], buf);
}

#[test]
fn renamed() {
    let mockery = Mockery::new();
    let clock = FakeClock::new(&mockery, "clock");
    mockery.expect(&clock).method("now").return_const(12u64);
    assert_eq!(12, clock.now());
}

#[test]
fn unsafe_trait() {
    let mockery = Mockery::new();
    let raw = MockRaw::new(&mockery, "raw");
    mockery.expect(&raw).method("peek").return_const(0xffu8);
    assert_eq!(0xff, raw.peek(0x1000));
}

#[test]
fn raw_identifiers_and_lifetimes() {
    let mockery = Mockery::new();
    let lexer = MockLexer::new(&mockery, "lexer");
    mockery.expect(&lexer)
        .method("match")
        .with_args([3u8])
        .return_const(true);
    mockery.expect(&lexer)
        .method("token")
        .with(vec![matcher::eq("abc")])
        .return_const(7u32);
    assert!(lexer.r#match(3));
    let input = String::from("abc");
    assert_eq!(7, lexer.token(&input));
}

#[test]
fn clone_shares_expectations() {
    let mockery = Mockery::new();
    let turtle = MockTurtle::new(&mockery, "turtle");
    let clone = turtle.clone();
    mockery.expect(&turtle).method("forward").times(2);
    turtle.forward(1);
    clone.forward(2);
}

/// Two mocks of the same trait are distinct receivers
#[test]
#[should_panic(expected = "unexpected invocation: right.forward(1)")]
fn distinct_objects() {
    let mockery = Mockery::new();
    let left = MockTurtle::new(&mockery, "left");
    let right = MockTurtle::new(&mockery, "right");
    mockery.allow(&left).method("forward");
    right.forward(1);
}

#[test]
#[should_panic(expected = "no return value configured for turtle.position()")]
#[cfg(not(feature = "nightly"))]
fn missing_return() {
    let mockery = Mockery::new();
    let turtle = MockTurtle::new(&mockery, "turtle");
    mockery.expect(&turtle).method("position");
    turtle.position();
}

#[test]
#[cfg(feature = "nightly")]
fn default_return() {
    let mockery = Mockery::new();
    let turtle = MockTurtle::new(&mockery, "turtle");
    mockery.expect(&turtle).method("position");
    assert_eq!((0, 0), turtle.position());
}
