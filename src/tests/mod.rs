mod roundtrip_test;
