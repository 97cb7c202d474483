use nsrecruit_api::types::{Action, Happening, HappeningPattern};
use nsrecruit_api::xml::{decode_can_recruit, decode_happenings};
use nsrecruit_api::Error;

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn decode(xml: &str) -> Result<Vec<Happening>, Error> {
    decode_happenings(xml, &HappeningPattern::new().unwrap())
}

#[test]
fn founding_fixture_decodes() {
    let happenings = decode(&load_fixture("happenings_founding.xml")).unwrap();
    let names: Vec<&str> = happenings.iter().map(|h| h.nation.as_str()).collect();
    assert_eq!(
        names,
        vec!["fresh_start", "back_again", "puppet_farm_12", "quiet_meadow"]
    );
    assert_eq!(happenings[1].action, Action::Refounded);
    assert!(happenings.iter().all(|h| h.timestamp.is_some()));
}

#[test]
fn eject_fixture_decodes() {
    let happenings = decode(&load_fixture("happenings_eject.xml")).unwrap();
    assert_eq!(happenings.len(), 2);
    assert_eq!(happenings[0].nation, "exiled_one");
    assert_eq!(happenings[1].nation, "banned_two");
    assert!(happenings.iter().all(|h| h.action == Action::Ejected));
}

#[test]
fn escaped_text_nodes_decode() {
    let xml = "<WORLD><HAPPENINGS><EVENT><TEXT>@@a&amp;b@@ was founded in %%r%%.</TEXT></EVENT></HAPPENINGS></WORLD>";
    let happenings = decode(xml).unwrap();
    assert_eq!(happenings[0].nation, "a&b");
    assert_eq!(happenings[0].timestamp, None);
}

#[test]
fn can_recruit_trims_whitespace() {
    let xml = "<NATION id=\"x\">\n  <TGCANRECRUIT> 1 </TGCANRECRUIT>\n</NATION>";
    assert!(decode_can_recruit(xml).unwrap());
}

#[test]
fn cut_off_fixture_is_a_parse_error() {
    let full = load_fixture("happenings_founding.xml");
    let cut = &full[..full.find("</HAPPENINGS>").unwrap()];
    assert!(matches!(decode(cut), Err(Error::Parse(_))));
}
