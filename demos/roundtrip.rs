//! Encode a short literal, print it, decode it back, and print the result.

fn main() {
    tracing_subscriber::fmt::init();

    let original = b"Hello, world!\0";

    print!("Original data:\r\n    ");
    for b in original {
        print!("{:02X} ", b);
    }

    let code = multicode::encode(original, 8);
    println!("\r\nEncoded:\r\n    {code}");

    let recovered = multicode::decode(&code, original.len(), 8);

    if recovered.is_empty() {
        print!("\r\nFailed to recover data");
    } else {
        print!("\r\nRecovered:\r\n    ");
        for b in &recovered {
            print!("{:02X} ", b);
        }
        let result = String::from_utf8_lossy(&recovered);
        println!("\r\n    {result}");
    }
}
