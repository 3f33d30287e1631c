use es_gettext_plural::PluralRule;
use rstest::rstest;

const ARABIC: &str = " nplurals=6; plural= n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5;\n";
const UKRAINIAN: &str = "nplurals=3; plural=n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2;\n";
const FRENCH: &str = " nplurals=2; plural=n>1;";

#[rstest]
#[case(ARABIC, 0, 0)]
#[case(ARABIC, 1, 1)]
#[case(ARABIC, 2, 2)]
#[case(ARABIC, 5, 3)]
#[case(ARABIC, 12, 4)]
#[case(ARABIC, 102, 5)]
#[case(UKRAINIAN, 0, 2)]
#[case(UKRAINIAN, 1, 0)]
#[case(UKRAINIAN, 2, 1)]
#[case(UKRAINIAN, 5, 2)]
#[case(UKRAINIAN, 100, 2)]
#[case(UKRAINIAN, 32, 1)]
#[case(FRENCH, 0, 0)]
#[case(FRENCH, 1, 0)]
#[case(FRENCH, 5, 1)]
#[case(FRENCH, 100, 1)]
fn header_formula(#[case] header: &str, #[case] n: u64, #[case] expected: usize) {
    let rule = PluralRule::parse(header).unwrap();
    assert_eq!(rule.index(n), expected, "{} with n = {}", header.trim(), n);
}

#[rstest]
#[case("#@", 0, 0)]
#[case("#@", 1, 0)]
#[case("#@", 10, 0)]
#[case("zh", 0, 0)]
#[case("zh", 10, 0)]
#[case("zh_CN", 1, 0)]
#[case("zh_CN", 10, 0)]
#[case("en", 0, 1)]
#[case("en", 1, 0)]
#[case("en", 2, 1)]
#[case("en_US", 1, 0)]
#[case("en_US", 10, 1)]
#[case("fr_FR", 0, 0)]
#[case("fr_FR", 2, 1)]
#[case("ru", 21, 0)]
#[case("ru", 22, 1)]
#[case("ru", 25, 2)]
#[case("pl", 1, 0)]
#[case("pl", 3, 1)]
#[case("pl", 12, 2)]
fn language_formula(#[case] lang: &str, #[case] n: u64, #[case] expected: usize) {
    assert_eq!(PluralRule::for_language(lang).index(n), expected, "{} with n = {}", lang, n);
}

#[test]
fn arabic_declares_six_forms() {
    assert_eq!(PluralRule::parse(ARABIC).unwrap().nplurals(), 6);
}

#[test]
fn rules_are_shareable_across_threads() {
    let rule = PluralRule::parse(UKRAINIAN).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let rule = rule.clone();
            std::thread::spawn(move || (0..1000u64).map(|n| rule.index(n)).sum::<usize>())
        })
        .collect();

    let sums: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(sums.windows(2).all(|pair| pair[0] == pair[1]));
}
