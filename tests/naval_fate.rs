use docopt_engine::{apply, Value};

const NAVAL: &str = "\
Naval Fate.

Usage:
  naval_fate.py ship new <name>...
  naval_fate.py ship <name> move <x> <y> [--speed=<kn>]
  naval_fate.py ship shoot <x> <y>
  naval_fate.py mine (set|remove) <x> <y> [--moored|--drifting]
  naval_fate.py -h | --help
  naval_fate.py --version

Options:
  -h --help     Show this screen.
  --version     Show version.
  --speed=<kn>  Speed in knots [default: 10].
  --moored      Moored (anchored) mine.
  --drifting    Drifting mine.
";

fn s(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

#[test]
fn ship_new_collects_repeating_names() {
    let result = apply(NAVAL, &s(&["ship", "new", "Guardian", "Interceptor"]), false, None, false).unwrap();
    assert_eq!(
        result["<name>"],
        Value::List(vec![Value::Str("Guardian".into()), Value::Str("Interceptor".into())])
    );
}

#[test]
fn ship_shoot_at_coordinates() {
    let result = apply(NAVAL, &s(&["ship", "shoot", "10", "20"]), false, None, false).unwrap();
    assert_eq!(result["shoot"], Value::Bool(true));
    assert_eq!(result["<x>"], Value::Str("10".to_string()));
    assert_eq!(result["<y>"], Value::Str("20".to_string()));
}

#[test]
fn mine_set_with_drifting_flag() {
    let result = apply(NAVAL, &s(&["mine", "set", "1", "2", "--drifting"]), false, None, false).unwrap();
    assert_eq!(result["set"], Value::Bool(true));
    assert_eq!(result["remove"], Value::Bool(false));
    assert_eq!(result["--drifting"], Value::Bool(true));
    assert_eq!(result["--moored"], Value::Bool(false));
}

#[test]
fn help_short_circuits_before_matching_fails() {
    let err = apply(NAVAL, &s(&["--help"]), true, None, false).unwrap_err();
    assert_eq!(err.exit_request(), Some((NAVAL, 0)));
}

#[test]
fn bogus_command_is_an_input_error_carrying_usage() {
    let err = apply(NAVAL, &s(&["submarine"]), false, None, false).unwrap_err();
    assert!(!err.is_exit_requested());
}
