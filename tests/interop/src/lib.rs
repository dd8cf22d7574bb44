//! Integration tests for tlskeys.
//! Two simulated peers run the key-material side of a TLS 1.3 handshake
//! across the types, crypto and tls crates.

#[cfg(test)]
mod tests {
    use tlskeys_tls::config::KeyPoolConfig;
    use tlskeys_tls::crypt::key_schedule::KeySchedule;
    use tlskeys_tls::crypt::transcript::TranscriptHash;
    use tlskeys_tls::crypt::{CipherSuiteParams, NamedGroup};
    use tlskeys_tls::handshake::KeyPoolSet;
    use tlskeys_tls::session::{
        decode_session_state, encode_session_state, ResumeMechanism, SessionRecord, TlsSession,
    };
    use tlskeys_tls::{CipherSuite, TlsVersion};
    use tlskeys_types::TlsError;

    /// Everything one side holds after a full handshake.
    struct PeerSecrets {
        client_hs: Vec<u8>,
        server_hs: Vec<u8>,
        client_app: Vec<u8>,
        server_app: Vec<u8>,
        ch_sf_hash: Vec<u8>,
        ks: KeySchedule,
    }

    fn run_side(
        suite: CipherSuite,
        shared_secret: &[u8],
        psk: Option<&[u8]>,
        transcript: &mut TranscriptHash,
    ) -> PeerSecrets {
        let params = CipherSuiteParams::from_suite(suite).unwrap();
        let mut ks = KeySchedule::new(params);
        ks.derive_early_secret(psk).unwrap();
        ks.derive_handshake_secret(shared_secret).unwrap();
        let (client_hs, server_hs) = ks
            .derive_handshake_traffic_secrets(&transcript.current_hash().unwrap())
            .unwrap();

        transcript.update(b"EncryptedExtensions|Certificate|CertificateVerify|Finished(server)");
        let ch_sf_hash = transcript.current_hash().unwrap();
        ks.derive_master_secret().unwrap();
        let (client_app, server_app) = ks.derive_app_traffic_secrets(&ch_sf_hash).unwrap();
        PeerSecrets {
            client_hs,
            server_hs,
            client_app,
            server_app,
            ch_sf_hash,
            ks,
        }
    }

    fn hello_transcripts(
        suite: CipherSuite,
        client_share: &[u8],
        server_share: &[u8],
    ) -> (TranscriptHash, TranscriptHash) {
        let params = CipherSuiteParams::from_suite(suite).unwrap();
        let mut client = TranscriptHash::for_suite(&params);
        let mut server = TranscriptHash::for_suite(&params);
        for t in [&mut client, &mut server] {
            t.update(b"ClientHello");
            t.update(client_share);
            t.update(b"ServerHello");
            t.update(server_share);
        }
        (client, server)
    }

    fn full_handshake(
        pools: &KeyPoolSet,
        group: NamedGroup,
        suite: CipherSuite,
    ) -> (PeerSecrets, PeerSecrets) {
        let client_key = pools.acquire(group).unwrap();
        let server_key = pools.acquire(group).unwrap();
        let client_dhe = client_key
            .compute_shared_secret(server_key.public_key_bytes())
            .unwrap();
        let server_dhe = server_key
            .compute_shared_secret(client_key.public_key_bytes())
            .unwrap();
        assert_eq!(client_dhe, server_dhe);

        let (mut ct, mut st) = hello_transcripts(
            suite,
            client_key.public_key_bytes(),
            server_key.public_key_bytes(),
        );
        (
            run_side(suite, &client_dhe, None, &mut ct),
            run_side(suite, &server_dhe, None, &mut st),
        )
    }

    // -------------------------------------------------------
    // 1. Pooled ECDHE → key schedule agreement on every group/suite
    // -------------------------------------------------------
    #[test]
    fn test_handshake_agreement_all_groups_and_suites() {
        let pools = KeyPoolSet::new(&KeyPoolConfig::builder().capacity(4).build());
        pools.initialize_all();

        for group in [
            NamedGroup::X25519,
            NamedGroup::SECP256R1,
            NamedGroup::SECP384R1,
            NamedGroup::SECP521R1,
        ] {
            for suite in [
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_AES_256_GCM_SHA384,
                CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
            ] {
                let (client, server) = full_handshake(&pools, group, suite);
                assert_eq!(client.client_hs, server.client_hs);
                assert_eq!(client.server_hs, server.server_hs);
                assert_eq!(client.client_app, server.client_app);
                assert_eq!(client.server_app, server.server_app);
                assert_ne!(client.client_hs, client.server_hs);

                let params = client.ks.params();
                for secret in [&client.client_hs, &client.server_app] {
                    let a = client.ks.traffic_key_and_iv(secret).unwrap();
                    let b = server.ks.traffic_key_and_iv(secret).unwrap();
                    assert_eq!(a.key, b.key);
                    assert_eq!(a.iv, b.iv);
                    assert_eq!(a.key.len(), params.key_len);
                }
            }
        }
    }

    // -------------------------------------------------------
    // 2. Finished exchange
    // -------------------------------------------------------
    #[test]
    fn test_finished_exchange() {
        let pools = KeyPoolSet::new(&KeyPoolConfig::builder().capacity(2).build());
        let (client, server) = full_handshake(
            &pools,
            NamedGroup::X25519,
            CipherSuite::TLS_AES_128_GCM_SHA256,
        );

        let transcript = client.ch_sf_hash.clone();
        let server_finished = server
            .ks
            .finished_verify_data(&server.server_hs, &transcript)
            .unwrap();
        assert!(client
            .ks
            .verify_finished(&client.server_hs, &transcript, &server_finished)
            .unwrap());

        // A Finished keyed with the wrong direction must not verify
        let wrong_direction = server
            .ks
            .finished_verify_data(&server.client_hs, &transcript)
            .unwrap();
        assert!(!client
            .ks
            .verify_finished(&client.server_hs, &transcript, &wrong_direction)
            .unwrap());
    }

    // -------------------------------------------------------
    // 3. Exporter agreement
    // -------------------------------------------------------
    #[test]
    fn test_exporter_agreement() {
        let pools = KeyPoolSet::new(&KeyPoolConfig::builder().capacity(2).build());
        let (client, server) = full_handshake(
            &pools,
            NamedGroup::SECP384R1,
            CipherSuite::TLS_AES_256_GCM_SHA384,
        );
        let ce = client.ks.exporter(&client.ch_sf_hash).unwrap();
        let se = server.ks.exporter(&server.ch_sf_hash).unwrap();
        for (label, ctx, len) in [
            (&b"EXPORTER-Channel-Binding"[..], None, 32),
            (&b"EXPORTER-app"[..], Some(&b"session-1"[..]), 64),
        ] {
            assert_eq!(
                ce.export(label, ctx, len).unwrap(),
                se.export(label, ctx, len).unwrap()
            );
        }
        assert!(matches!(
            ce.export(b"key expansion", None, 32),
            Err(TlsError::HandshakeFailed(_))
        ));
    }

    // -------------------------------------------------------
    // 4. KeyUpdate keeps both sides in step
    // -------------------------------------------------------
    #[test]
    fn test_key_update_chain() {
        let pools = KeyPoolSet::new(&KeyPoolConfig::builder().capacity(2).build());
        let (client, server) = full_handshake(
            &pools,
            NamedGroup::SECP256R1,
            CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
        );
        let mut c = client.client_app.clone();
        let mut s = server.client_app.clone();
        for _ in 0..3 {
            let next_c = client.ks.next_traffic_secret(&c).unwrap();
            let next_s = server.ks.next_traffic_secret(&s).unwrap();
            assert_eq!(next_c, next_s);
            assert_ne!(next_c, c);
            c = next_c;
            s = next_s;
        }
        let ck = client.ks.traffic_key_and_iv(&c).unwrap();
        let sk = server.ks.traffic_key_and_iv(&s).unwrap();
        assert_eq!(ck.key, sk.key);
    }

    // -------------------------------------------------------
    // 5. HelloRetryRequest transcript on both sides
    // -------------------------------------------------------
    #[test]
    fn test_hello_retry_transcript() {
        let params = CipherSuiteParams::from_suite(CipherSuite::TLS_AES_128_GCM_SHA256).unwrap();
        let mut client = TranscriptHash::for_suite(&params);
        let mut server = TranscriptHash::for_suite(&params);
        for t in [&mut client, &mut server] {
            t.update(b"ClientHello1");
            t.replace_with_message_hash().unwrap();
            t.update(b"HelloRetryRequest");
            t.update(b"ClientHello2");
        }
        assert_eq!(client.current_hash().unwrap(), server.current_hash().unwrap());

        let mut no_retry = TranscriptHash::for_suite(&params);
        no_retry.update(b"ClientHello1HelloRetryRequestClientHello2");
        assert_ne!(client.current_hash().unwrap(), no_retry.current_hash().unwrap());
    }

    // -------------------------------------------------------
    // 6. Resumption: ticket → persisted session → PSK handshake
    // -------------------------------------------------------
    #[test]
    fn test_resumption_through_session_state() {
        let suite = CipherSuite::TLS_AES_128_GCM_SHA256;
        let pools = KeyPoolSet::new(&KeyPoolConfig::builder().capacity(2).build());
        let (client, server) = full_handshake(&pools, NamedGroup::X25519, suite);

        let rms_c = client.ks.derive_resumption_master_secret(&[0x5A; 32]).unwrap();
        let rms_s = server.ks.derive_resumption_master_secret(&[0x5A; 32]).unwrap();
        let nonce = [0x00, 0x01];
        let psk = client.ks.derive_resumption_psk(&rms_c, &nonce).unwrap();
        assert_eq!(psk, server.ks.derive_resumption_psk(&rms_s, &nonce).unwrap());

        let mut session = TlsSession::new(TlsVersion::Tls13, suite, rms_c.clone());
        session.ticket = Some(vec![0xEE; 64]);
        session.select_resume_type();
        session.extra.push(b"app-owned".to_vec());
        let stored = encode_session_state(&session).unwrap();

        let restored = decode_session_state(&stored).unwrap();
        assert_eq!(restored.resume_type, ResumeMechanism::SESSION_TICKET);
        assert_eq!(restored.master_secret, rms_c);
        assert_eq!(restored.extra[0], b"app-owned".to_vec());
        assert!(restored.has_session_extra());

        let restored_psk = KeySchedule::new(CipherSuiteParams::from_suite(suite).unwrap())
            .derive_resumption_psk(&restored.master_secret, &nonce)
            .unwrap();
        assert_eq!(restored_psk, psk);

        // PSK handshake: binder keys and early traffic agree
        let mut ck = KeySchedule::new(CipherSuiteParams::from_suite(suite).unwrap());
        let mut sk = KeySchedule::new(CipherSuiteParams::from_suite(suite).unwrap());
        ck.derive_early_secret(Some(&restored_psk)).unwrap();
        sk.derive_early_secret(Some(&psk)).unwrap();
        assert_eq!(
            ck.derive_binder_key(false).unwrap(),
            sk.derive_binder_key(false).unwrap()
        );
        let ch_hash = [0x11; 32];
        assert_eq!(
            ck.derive_early_traffic_secret(&ch_hash).unwrap(),
            sk.derive_early_traffic_secret(&ch_hash).unwrap()
        );
    }

    // -------------------------------------------------------
    // 7. TLS 1.2 session-id resumption metadata survives storage
    // -------------------------------------------------------
    #[test]
    fn test_session_id_metadata_roundtrip() {
        let mut session = TlsSession::new(
            TlsVersion::Tls12,
            CipherSuite(0xC02F),
            vec![0x42; 48],
        );
        session.id = (0u8..32).collect();
        session.extended_master_secret = true;
        session.select_resume_type();
        let restored = decode_session_state(&encode_session_state(&session).unwrap()).unwrap();
        assert_eq!(restored.version, TlsVersion::Tls12);
        assert_eq!(restored.resume_type, ResumeMechanism::SESSION_ID);
        assert_eq!(restored.id, session.id);
        assert_eq!(
            restored.session_extra().unwrap(),
            session.resumption_data()
        );
    }

    // -------------------------------------------------------
    // 8. Global pool end to end
    // -------------------------------------------------------
    #[test]
    fn test_global_pool_acquire() {
        let a = tlskeys_tls::handshake::key_pool::acquire(NamedGroup::SECP256R1).unwrap();
        let b = tlskeys_crypto::ecdh::EcdhKeyPair::generate(tlskeys_types::EccCurveId::NistP256)
            .unwrap();
        let s1 = a.compute_shared_secret(b.public_key_bytes()).unwrap();
        let s2 = b.compute_shared_secret(a.public_key_bytes()).unwrap();
        assert_eq!(s1, s2);
        assert!(matches!(
            tlskeys_tls::handshake::key_pool::acquire(NamedGroup::FFDHE3072),
            Err(TlsError::UnsupportedGroup(0x0101))
        ));
    }
}
