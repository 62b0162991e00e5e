use structopt::StructOpt;

macro_rules! assert_match {
    ($a:expr => $b:pat) => {
        assert!(match $a {
            $b => true,
            _ => false,
        });
    };
}

#[test]
fn run_with_no_args() {
    let args = [""];
    let res = snatch::Opt::from_iter_safe(&args);
    assert_match!(res => Err(_));
}

#[test]
fn run_show_local_offline() {
    let args = ["", "show", "http://localhost/sandbox/1"];
    let res = snatch::Opt::from_iter_safe(&args);
    assert_match!(res => Ok(_));
}
