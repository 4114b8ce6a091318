//! Falcon-512 demonstration program

use falcon512::{
    generate_keypair, sign, verify_signature, FalconTree, Result, FALCON_512,
};

fn main() -> Result<()> {
    println!("Falcon-512 (FN-DSA) demonstration");
    println!("=================================");
    println!();
    println!("Parameters:");
    println!("  degree (n):        {}", FALCON_512.n);
    println!("  modulus (q):       {}", FALCON_512.q);
    println!("  security level:    {} bits", FALCON_512.security_level);
    println!("  public key size:   {} bytes", FALCON_512.public_key_len);
    println!("  secret key size:   {} bytes", FALCON_512.secret_key_len);
    println!("  signature size:    {} bytes", FALCON_512.signature_len);
    println!();

    print!("generating key pair... ");
    let (sk, pk) = generate_keypair()?;
    println!("ok");
    println!("  public key:  {} bytes", pk.to_bytes().len());
    println!("  secret key:  {} bytes", sk.to_bytes()?.len());

    print!("building sampling tree... ");
    let tree = FalconTree::new(&sk)?;
    println!("ok");

    let message = b"Falcon-512 signs short and verifies fast.";
    println!("message: {:?}", core::str::from_utf8(message).unwrap_or("<binary>"));

    print!("signing... ");
    let signature = sign(&sk, &tree, message)?;
    println!("ok ({} bytes)", signature.to_bytes().len());

    print!("verifying... ");
    if verify_signature(&pk, message, &signature) {
        println!("valid");
    } else {
        println!("INVALID");
    }

    print!("verifying against a tampered message... ");
    if verify_signature(&pk, b"Falcon-512 signs short and verifies slow.", &signature) {
        println!("INCORRECTLY ACCEPTED");
    } else {
        println!("rejected");
    }

    Ok(())
}
