//! Standard `Plural-Forms` values for catalogs that do not declare one.

const ONE_FORM: &str = "nplurals=1; plural=0;";
const GERMANIC: &str = "nplurals=2; plural=(n != 1);";
const ROMANCE_ZERO_SINGULAR: &str = "nplurals=2; plural=(n > 1);";
const EAST_SLAVIC: &str =
    "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";
const CZECH: &str = "nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;";
const POLISH: &str =
    "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";
const LITHUANIAN: &str =
    "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2);";
const LATVIAN: &str = "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2);";
const ROMANIAN: &str =
    "nplurals=3; plural=n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2;";
const IRISH: &str = "nplurals=3; plural=n==1 ? 0 : n==2 ? 1 : 2;";
const SLOVENIAN: &str =
    "nplurals=4; plural=(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3);";
const ARABIC: &str = "nplurals=6; plural=(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5);";

/// Most specific codes first: `pt_BR` must win over `pt`.
const TABLE: &[(&str, &str)] = &[
    ("pt_BR", ROMANCE_ZERO_SINGULAR),
    ("ar", ARABIC),
    ("be", EAST_SLAVIC),
    ("bg", GERMANIC),
    ("bs", EAST_SLAVIC),
    ("ca", GERMANIC),
    ("cs", CZECH),
    ("da", GERMANIC),
    ("de", GERMANIC),
    ("el", GERMANIC),
    ("en", GERMANIC),
    ("eo", GERMANIC),
    ("es", GERMANIC),
    ("et", GERMANIC),
    ("fi", GERMANIC),
    ("fo", GERMANIC),
    ("fr", ROMANCE_ZERO_SINGULAR),
    ("ga", IRISH),
    ("he", GERMANIC),
    ("hr", EAST_SLAVIC),
    ("hu", GERMANIC),
    ("id", ONE_FORM),
    ("it", GERMANIC),
    ("ja", ONE_FORM),
    ("ko", ONE_FORM),
    ("lt", LITHUANIAN),
    ("lv", LATVIAN),
    ("nb", GERMANIC),
    ("nl", GERMANIC),
    ("nn", GERMANIC),
    ("no", GERMANIC),
    ("oc", ROMANCE_ZERO_SINGULAR),
    ("pl", POLISH),
    ("pt", GERMANIC),
    ("ro", ROMANIAN),
    ("ru", EAST_SLAVIC),
    ("sk", CZECH),
    ("sl", SLOVENIAN),
    ("sr", EAST_SLAVIC),
    ("sv", GERMANIC),
    ("th", ONE_FORM),
    ("tr", ROMANCE_ZERO_SINGULAR),
    ("uk", EAST_SLAVIC),
    ("vi", ONE_FORM),
    ("zh", ONE_FORM),
];

/// Finds the `Plural-Forms` value for `lang`, matching whole subtags only.
pub(crate) fn plural_forms_for(lang: &str) -> Option<&'static str> {
    let normalized = lang.trim().replace('-', "_");
    TABLE
        .iter()
        .find(|(code, _)| {
            normalized
                .strip_prefix(code)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['_', '.', '@']))
        })
        .map(|(_, forms)| *forms)
}
