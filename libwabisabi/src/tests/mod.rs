mod credential_exchange;
