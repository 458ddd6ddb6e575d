use brain_wallet::{generate_brain_wallet, AccountKind, AddressEncoding, Network};

const GOLDEN_TEXT: &str = "correct horse battery staple correct horse battery staple";

#[test]
fn golden_entropy_and_mnemonic() {
    let entropy = brain_wallet::derive_entropy(GOLDEN_TEXT);
    assert_eq!(entropy.to_hex().as_str(), "e6306a0c48fb6389e953fcca343d67a1");

    let wallet = generate_brain_wallet(GOLDEN_TEXT, 3, Network::Bitcoin).expect("derivation succeeds");
    assert_eq!(
        wallet.mnemonic.as_str(),
        "tower local loan music renew shaft pipe legend sketch peanut fly duck"
    );
    assert_eq!(
        wallet.seed_hex.as_ref().map(|s| s.as_str()),
        Some(
            "9f4f0fa69b20d4a23c17f641831db501fcac2b9a6e81f749c041012952708ef9\
             6e3ac2fa672892caca878976f7313cca3ca6f52fa4bd145e260ce2b624347bb2"
        )
    );
}

#[test]
fn golden_xpubs_and_addresses() {
    let wallet = generate_brain_wallet(GOLDEN_TEXT, 3, Network::Bitcoin).expect("derivation succeeds");

    let expected = [
        (
            AccountKind::Legacy,
            "m/44'/0'/0'",
            "xpub6DUUbxTDc2LsxaXCNHdgggkgJ8rU2Q6QN7XadpbYNomn79fxoZ9hj2R18jbYnJH1fVzVkXouhp6N1dcZ2XJXbz6SdvpMqSacJsPTLAPnhcF",
            [
                "1LaM1neSnbeXWURqswY5d3x6AoyRBbhB78",
                "1H1tMV8VDfZy7T1SbrL8jKK4T2nLLXqrbQ",
                "14MLk5VobGSLGxzj6EYjz2NttH9HMnfach",
            ],
        ),
        (
            AccountKind::NestedSegwit,
            "m/49'/0'/0'",
            "xpub6C2bNPRGrBfE1tc529NHKPf8EBKR9uSfSa3PVVLhUqDdwKahFJ6Zh6864gf2Aki7syw4XhFNBYDSPyWGzL7HzPHMiCmJRtfsJaiafpBa8cZ",
            [
                "36ehgQvMJB3pReAhXTymeNaxC2nCQshwuK",
                "3QHtQCqQLrgQ92sgN5UuY4kutbayMAZRYN",
                "32zkoywLjYbAQqw23LXZ8gN48tGfGxWE9j",
            ],
        ),
        (
            AccountKind::NativeSegwit,
            "m/84'/0'/0'",
            "xpub6CLp57XVo3WZiJWCQWwH1NDKcKf4cZ4E3MPAKa4tRCotksrt5akqrA3iDSYyB2b6jSriPgZgucA1naZreAm1w4taKQGqbtwAKnipDCA4xob",
            [
                "bc1q8zlrw6vns9th5k2nz0j50wlgft7ysu3x6wmmrs",
                "bc1qqfvs0zx2vrjd539e5vxgeavcehjnp4qc750z9t",
                "bc1qn5g3tg8xu9fmzrc4m6972w5q0svadxhya8s595",
            ],
        ),
        (
            AccountKind::Taproot,
            "m/86'/0'/0'",
            "xpub6C5BRVJxUDr6NcC4kQtHPhr3f7uVcKF7ikMvY1YLt98UW2XNfdNs2F9rzfagybP8CL8Y3H46pvi7Tsmv1xxetvyTdVNL65aYsqVva1XxdE3",
            [
                "bc1pda4n884uggdvq4mp53zadufnwctwxukrfmsaade4akcfpncv5v9qc9cdud",
                "bc1p2p4uzt7r89elvd5czkg2450dtewyd70hr57qnxva60sfy2hkcmzq80xcp8",
                "bc1ph0caefdfyccg6q72022ashanthw66azvz0fyme49v7m9zh3wheks4ydu87",
            ],
        ),
    ];

    for (kind, path, xpub, addresses) in expected {
        let account = wallet.account(kind).expect("account present");
        assert_eq!(account.path, path);
        assert_eq!(account.xpub.as_deref(), Some(xpub), "{:?} xpub", kind);
        assert!(account.error.is_none());

        let derived: Vec<&str> = account.addresses.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(derived, addresses, "{:?} addresses", kind);
        assert!(account
            .addresses
            .iter()
            .all(|a| a.encoding == AddressEncoding::Standard));
    }
}

#[test]
fn golden_restore_round_trip() {
    let restored = brain_wallet::restore_from_mnemonic(
        "tower local loan music renew shaft pipe legend sketch peanut fly duck",
        1,
        Network::Bitcoin,
    )
    .expect("valid mnemonic");

    let legacy = restored.account(AccountKind::Legacy).expect("account present");
    assert_eq!(legacy.addresses[0].address, "1LaM1neSnbeXWURqswY5d3x6AoyRBbhB78");
}
