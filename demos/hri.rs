use std::io::Read;

use gs1_encoders::{bars_to_blocks, AiData, AiParser, Gs1_128, SymbologyId};

fn parse(parser: &AiParser, input: &str) -> Result<AiData, gs1_encoders::SyntaxError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        parser.parse_dl_uri(input)
    } else if input.starts_with(']') {
        parser.parse_scan_data(input).map(|(_, data)| data)
    } else if input.starts_with('^') {
        parser.parse_unbracketed(input)
    } else {
        parser.parse_bracketed(input)
    }
}

fn main() {
    let mut input = String::new();
    if atty::isnt(atty::Stream::Stdin) {
        let mut stdin = std::io::stdin();
        stdin.read_to_string(&mut input).unwrap();
    }
    let permit_unknown = std::env::args().any(|arg| arg == "--permit-unknown-ais");
    let parser = AiParser::default().with_unknown_ais(permit_unknown);

    let data = match parse(&parser, input.trim_end_matches(['\r', '\n'])) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    for line in data.hri(true) {
        println!("{}", line);
    }
    println!();
    println!("{:?}", data.to_scan_data(SymbologyId::Gs1_128));
    println!();
    let string = bars_to_blocks(Gs1_128::encode(&data).bars());
    println!("{}", &string);
    println!("{}", &string);
    println!("{}", &string);
}
