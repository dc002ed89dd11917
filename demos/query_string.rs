use urlkit::{
    http_build_query, query, BuildOptions, DecodeError, EncodingProfile, ParseOptions, QueryMap, QueryValue,
};

fn main() -> Result<(), DecodeError> {
    tracing_subscriber::fmt::init();

    // Flat entries keep their order and duplicates
    let entries = query! { tag = "rust", tag = "url", q = "a & b" };
    let raw = query::build(&entries, &BuildOptions::default());
    println!("built:  {}", raw);
    println!("parsed: {:?}", query::parse(&raw, &ParseOptions::default())?);

    // Nested data flattens to bracket keys
    let mut address = QueryMap::new();
    address.insert("city", "Lisbon");
    address.insert("zip", "1100-148");

    let mut data = QueryMap::new();
    data.insert("0", "positional");
    data.insert("user", address);
    data.insert("langs", QueryValue::List(vec!["en".into(), "pt".into()]));

    let raw = http_build_query(&data, Some("arg_"), "&", EncodingProfile::Rfc3986);
    println!("nested: {}", raw);

    let options = ParseOptions::default().with_profile(EncodingProfile::Rfc3986);
    let back = query::parse_nested(&raw, &options)?;
    println!("expanded: {:?}", back);

    Ok(())
}
