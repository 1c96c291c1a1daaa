use std::io::Write;

use notes_core::crypto::{decrypt, decrypt_text, derive_content_key, encrypt, encrypt_text};

use crate::app::AppContext;
use crate::cli::CipherArgs;
use crate::errors::CliError;
use crate::helpers::{read_input, resolve_signature};

pub fn handle_encrypt(ctx: &AppContext, args: &CipherArgs) -> anyhow::Result<()> {
    let signature = resolve_signature(ctx.cli())?;
    let key = derive_content_key(&signature, &args.address)?;
    let input = read_input(args.input.as_deref())?;

    if args.text {
        let plaintext = String::from_utf8(input)
            .map_err(|_| CliError::invalid_input("--text input must be valid UTF-8"))?;
        println!("{}", encrypt_text(&plaintext, &key)?);
    } else {
        write_stdout(&encrypt(&input, &key)?)?;
    }
    Ok(())
}

pub fn handle_decrypt(ctx: &AppContext, args: &CipherArgs) -> anyhow::Result<()> {
    let signature = resolve_signature(ctx.cli())?;
    let key = derive_content_key(&signature, &args.address)?;
    let input = read_input(args.input.as_deref())?;

    if args.text {
        let encoded = String::from_utf8_lossy(&input);
        print!("{}", decrypt_text(encoded.trim(), &key)?);
        std::io::stdout().flush()?;
    } else {
        write_stdout(&decrypt(&input, &key)?)?;
    }
    Ok(())
}

fn write_stdout(bytes: &[u8]) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}
