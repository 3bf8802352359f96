mod live_updates_test;
